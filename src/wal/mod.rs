//! Write-Ahead Log (WAL) Module
//!
//! Provides durability guarantees through append-only logging.
//!
//! ## Responsibilities
//! - Append a record and fsync it before any mutation is applied
//! - Serialize appends from every connection through one critical section
//! - Replay the log into a store on startup
//! - Detect partial writes and corruption during replay
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ 3SET3foo3bar\n                           │  Entry 1
//! ├──────────────────────────────────────────┤
//! │ 3DEL3foo\n                               │  Entry 2
//! ├──────────────────────────────────────────┤
//! │ 3SET5hello5world\n                       │  Entry 3
//! └──────────────────────────────────────────┘
//! ```
//! Records are length-prefixed fields followed by a newline (see
//! [`LogEntry`]). The file is only ever appended to, except that replay may
//! cut off a trailing record that was never completed.

mod entry;
mod noop;
mod recovery;
mod writer;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::store::KeyValueStore;

pub use entry::{DecodeError, LogEntry};
pub use noop::NoopWal;
pub use recovery::{RecoveryResult, WalRecovery};
pub use writer::FileWal;

/// The capability shared by the durable and the no-op log
pub trait WriteAheadLog: Send + Sync {
    /// Append `entry` and return only once it is durable
    ///
    /// A durable log fails with `KvError::AmbiguousRecord`, writing nothing,
    /// when the record would not replay as `entry`.
    fn log(&self, entry: &LogEntry) -> Result<()>;

    /// Replay every logged mutation into `store`, in log order
    fn rebuild(&self, store: &dyn KeyValueStore) -> Result<RecoveryResult>;
}

/// Build the WAL variant selected by the config
pub fn open_wal(config: &Config) -> Result<Arc<dyn WriteAheadLog>> {
    if config.persistence_enabled {
        let wal = FileWal::open(&config.wal_path, config.replay_policy)?;
        tracing::info!("Persistence enabled: WAL at {}", wal.path().display());
        Ok(Arc::new(wal))
    } else {
        tracing::warn!("Persistence disabled: mutations will not survive a restart");
        Ok(Arc::new(NoopWal::new()))
    }
}
