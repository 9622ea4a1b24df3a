//! Error types for shardkv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for shardkv operations
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // WAL Errors
    // -------------------------------------------------------------------------
    #[error("WAL corruption detected at byte {offset}: {reason}")]
    WalCorruption { offset: u64, reason: String },

    #[error("WAL write failed: {0}")]
    WalWrite(String),

    /// The record's bytes would replay as a different mutation
    #[error("ambiguous WAL record: {0}")]
    AmbiguousRecord(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl KvError {
    /// Whether the error means a mutation could not be made durable.
    ///
    /// The server stops the process on these instead of serving writes it
    /// cannot guarantee.
    pub fn is_fatal(&self) -> bool {
        matches!(self, KvError::WalWrite(_))
    }
}
