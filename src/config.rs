//! Configuration for shardkv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{KvError, Result};
use crate::store::HashFunction;

/// Main configuration for a shardkv instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Interface the listener binds to
    pub host: String,

    /// TCP port (1-65535)
    pub port: u16,

    // -------------------------------------------------------------------------
    // Store Configuration
    // -------------------------------------------------------------------------
    /// Capacity hint for the plain store
    pub initial_capacity: usize,

    /// Number of shards: 1 selects the plain store, more selects the sharded one
    pub shard_count: usize,

    /// Hash used to route keys to shards
    pub hash_function: HashFunction,

    // -------------------------------------------------------------------------
    // WAL Configuration
    // -------------------------------------------------------------------------
    /// Location of the write-ahead log file
    pub wal_path: PathBuf,

    /// When false, mutations are not logged and nothing is replayed
    pub persistence_enabled: bool,

    /// What replay does with a damaged tail
    pub replay_policy: ReplayPolicy,
}

/// How WAL replay treats a record that cannot be decoded
///
/// Corruption in the middle of the file is fatal under every policy; the
/// policies differ only for a trailing record that was never completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplayPolicy {
    /// Drop the uncommitted trailing record and truncate the file back to
    /// the last complete record
    #[default]
    TruncateTail,

    /// Refuse to start on any undecodable record
    Strict,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4242,
            initial_capacity: 32,
            shard_count: 1,
            hash_function: HashFunction::Djb2,
            wal_path: PathBuf::from("./wal_files/wal_file"),
            persistence_enabled: true,
            replay_policy: ReplayPolicy::TruncateTail,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Address the server listens on, as `host:port`
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Reject values the core cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(KvError::Config("port must be between 1 and 65535".to_string()));
        }
        if self.initial_capacity == 0 {
            return Err(KvError::Config(
                "initial capacity must be greater than 0".to_string(),
            ));
        }
        if self.shard_count == 0 {
            return Err(KvError::Config("shard count must be at least 1".to_string()));
        }
        if self.persistence_enabled && self.wal_path.as_os_str().is_empty() {
            return Err(KvError::Config(
                "a WAL path is required when persistence is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the listen host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the listen port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the capacity hint of the plain store
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.config.initial_capacity = capacity;
        self
    }

    /// Set the shard count
    pub fn shard_count(mut self, count: usize) -> Self {
        self.config.shard_count = count;
        self
    }

    /// Set the shard hash function
    pub fn hash_function(mut self, hash: HashFunction) -> Self {
        self.config.hash_function = hash;
        self
    }

    /// Set the WAL file path
    pub fn wal_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.wal_path = path.into();
        self
    }

    /// Enable or disable the WAL
    pub fn persistence_enabled(mut self, enabled: bool) -> Self {
        self.config.persistence_enabled = enabled;
        self
    }

    /// Set the replay policy
    pub fn replay_policy(mut self, policy: ReplayPolicy) -> Self {
        self.config.replay_policy = policy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
