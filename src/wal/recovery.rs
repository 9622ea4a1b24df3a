//! WAL Recovery
//!
//! Decodes a WAL image and decides what to do with damaged records.

use crate::config::ReplayPolicy;
use crate::error::{KvError, Result};
use super::LogEntry;

/// Handles WAL recovery at startup
pub struct WalRecovery;

/// Result of a recovery operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of entries successfully recovered
    pub entries_recovered: u64,

    /// How many of those were SET records
    pub sets: u64,

    /// How many of those were DEL records
    pub deletes: u64,

    /// Length of the log up to the end of the last complete record
    pub valid_len: u64,

    /// Bytes of an uncommitted trailing record that were discarded
    pub truncated_bytes: u64,
}

impl RecoveryResult {
    /// Whether replay discarded a trailing partial record
    pub fn was_truncated(&self) -> bool {
        self.truncated_bytes > 0
    }
}

impl WalRecovery {
    /// Decode every record in `log`, in file order
    ///
    /// A record that fails to decode is *trailing* when no newline follows
    /// its start: the append that wrote it never reached its terminator, so
    /// it was never acknowledged. Trailing records are dropped under
    /// [`ReplayPolicy::TruncateTail`] and rejected under
    /// [`ReplayPolicy::Strict`]. Any other failure means the log is damaged
    /// in the middle and is always an error.
    ///
    /// Nothing is returned on error, so a caller can never apply part of a
    /// log that turned out to be corrupt.
    pub fn recover(log: &[u8], policy: ReplayPolicy) -> Result<(Vec<LogEntry>, RecoveryResult)> {
        let mut entries = Vec::new();
        let mut result = RecoveryResult::default();
        let mut offset = 0usize;

        while offset < log.len() {
            match LogEntry::decode(&log[offset..]) {
                Ok((entry, consumed)) => {
                    match entry {
                        LogEntry::Set { .. } => result.sets += 1,
                        LogEntry::Delete { .. } => result.deletes += 1,
                    }
                    entries.push(entry);
                    offset += consumed;
                }
                Err(err) => {
                    let rest = &log[offset..];
                    let trailing = !rest.contains(&b'\n');

                    if trailing && policy == ReplayPolicy::TruncateTail {
                        tracing::warn!(
                            "Dropping {} byte partial record at end of WAL (offset {}): {}",
                            rest.len(),
                            offset,
                            err
                        );
                        result.truncated_bytes = rest.len() as u64;
                        break;
                    }

                    let reason = if trailing {
                        format!("partial trailing record: {err}")
                    } else {
                        err.to_string()
                    };
                    return Err(KvError::WalCorruption {
                        offset: offset as u64,
                        reason,
                    });
                }
            }
        }

        result.entries_recovered = entries.len() as u64;
        result.valid_len = offset as u64;
        Ok((entries, result))
    }
}
