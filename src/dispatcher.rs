//! Dispatcher Module
//!
//! Turns request lines into store operations and responses.
//!
//! ## Responsibilities
//! - Parse a request line into a command
//! - Log mutations to the WAL before applying them to the store
//! - Replay the WAL into the store on startup

use std::sync::Arc;

use crate::config::Config;
use crate::error::{KvError, Result};
use crate::protocol::{Command, CommandType, ProtocolError, Response};
use crate::store::{open_store, KeyValueStore};
use crate::wal::{open_wal, LogEntry, WriteAheadLog};

/// Executes commands against the shared store and WAL
///
/// ## Ordering
/// For SET and DEL the WAL append (including its fsync) returns before the
/// store is touched. If the append fails the store is left alone and the
/// error is returned, so a mutation is never visible without a durable
/// record. A record the WAL refuses as ambiguous is answered with a `-`
/// line and never applied.
///
/// GET only takes the store's read lock and never waits on the WAL.
pub struct Dispatcher {
    /// Shared with every connection; no exclusive access across operations
    store: Arc<dyn KeyValueStore>,

    wal: Arc<dyn WriteAheadLog>,
}

impl Dispatcher {
    /// Wrap an existing store and WAL. Does not replay anything.
    pub fn new(store: Arc<dyn KeyValueStore>, wal: Arc<dyn WriteAheadLog>) -> Self {
        Self { store, wal }
    }

    /// Build the store and WAL selected by `config` and replay the WAL
    ///
    /// On startup:
    /// 1. Validate the config
    /// 2. Create the plain or sharded store
    /// 3. Open the durable or no-op WAL
    /// 4. Replay every logged mutation into the store
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;

        let store = open_store(config);
        let wal = open_wal(config)?;

        let recovery = wal.rebuild(store.as_ref())?;
        tracing::info!(
            "Store rebuilt: {} keys from {} log entries",
            store.len(),
            recovery.entries_recovered
        );

        Ok(Self::new(store, wal))
    }

    /// Handle one request line
    ///
    /// Returns `Ok(None)` for a blank line. Protocol errors come back as
    /// `-` responses; `Err` is reserved for WAL failures.
    pub fn dispatch(&self, line: &[u8]) -> Result<Option<Response>> {
        match Command::parse(line) {
            Ok(Some(command)) => self.execute(command).map(Some),
            Ok(None) => Ok(None),
            Err(err) => Ok(Some(Response::Error(err))),
        }
    }

    /// Execute a parsed command
    pub fn execute(&self, command: Command) -> Result<Response> {
        match command {
            Command::Set { key, value } => {
                let entry = LogEntry::set(key.clone(), value.clone());
                if let Some(rejected) = self.log_mutation(&entry, CommandType::Set)? {
                    return Ok(rejected);
                }
                self.store.set(key, value);
                Ok(Response::Ok)
            }
            Command::Get { key } => Ok(match self.store.get(&key) {
                Some(value) => Response::Value(value),
                None => Response::NotFound(key),
            }),
            Command::Del { key } => {
                if let Some(rejected) = self.log_mutation(&LogEntry::delete(key.clone()), CommandType::Del)? {
                    return Ok(rejected);
                }
                self.store.delete(&key);
                Ok(Response::Ok)
            }
        }
    }

    /// Append `entry`, answering with an error line instead when the WAL
    /// refuses a record it could not replay faithfully
    fn log_mutation(&self, entry: &LogEntry, command_type: CommandType) -> Result<Option<Response>> {
        match self.wal.log(entry) {
            Ok(()) => Ok(None),
            Err(KvError::AmbiguousRecord(reason)) => {
                tracing::debug!("Rejected {}: {}", command_type.name(), reason);
                Ok(Some(Response::Error(ProtocolError::Unloggable(command_type))))
            }
            Err(e) => Err(e),
        }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }
}
