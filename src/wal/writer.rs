//! Durable WAL
//!
//! Appends records to a file and fsyncs each one before acknowledging it.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::config::ReplayPolicy;
use crate::error::{KvError, Result};
use crate::store::KeyValueStore;
use super::{LogEntry, RecoveryResult, WalRecovery, WriteAheadLog};

/// File-backed write-ahead log
///
/// ## Concurrency
/// - `file`: the append + fsync pair runs under one mutex, so records from
///   different connections never interleave and on-disk order is call order
/// - `poisoned`: set after the first failed append; later appends fail
///   without touching the file
///
/// Every append pays for an fsync. That is the commit point of a mutation,
/// so appends are deliberately not batched.
pub struct FileWal {
    path: PathBuf,

    /// Opened once for read + append, held until the process exits
    file: Mutex<File>,

    replay_policy: ReplayPolicy,

    poisoned: AtomicBool,
}

impl FileWal {
    /// Open or create the WAL file, creating parent directories as needed
    pub fn open(path: impl AsRef<Path>, replay_policy: ReplayPolicy) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        tracing::debug!("Opened WAL at {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            replay_policy,
            poisoned: AtomicBool::new(false),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether an earlier append failed
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.load(Ordering::Acquire)
    }
}

impl WriteAheadLog for FileWal {
    fn log(&self, entry: &LogEntry) -> Result<()> {
        let bytes = entry.encode();
        if !entry.decodes_to_self(&bytes) {
            tracing::warn!(
                "Refusing {} record for key {:?}: it would replay as a different mutation",
                entry.op(),
                String::from_utf8_lossy(entry.key())
            );
            return Err(KvError::AmbiguousRecord(format!(
                "{} record for key {:?} does not decode back to itself",
                entry.op(),
                String::from_utf8_lossy(entry.key())
            )));
        }

        let mut file = self.file.lock();

        if self.is_poisoned() {
            return Err(KvError::WalWrite(
                "log is unusable after an earlier write failure".to_string(),
            ));
        }

        let written = file.write_all(&bytes).and_then(|_| file.sync_data());
        if let Err(e) = written {
            self.poisoned.store(true, Ordering::Release);
            tracing::error!("Failed to append {} record to {}: {}", entry.op(), self.path.display(), e);
            return Err(KvError::WalWrite(e.to_string()));
        }

        tracing::trace!("Appended {} record ({} bytes)", entry.op(), bytes.len());
        Ok(())
    }

    fn rebuild(&self, store: &dyn KeyValueStore) -> Result<RecoveryResult> {
        let mut file = self.file.lock();

        let mut log = Vec::new();
        file.seek(SeekFrom::Start(0))?;
        file.read_to_end(&mut log)?;

        let (entries, result) = WalRecovery::recover(&log, self.replay_policy)?;

        for entry in entries {
            entry.apply_to(store);
        }

        // Later appends must start on a record boundary
        if result.was_truncated() {
            file.set_len(result.valid_len)?;
            file.sync_all()?;
            tracing::warn!(
                "Truncated {} to {} bytes ({} bytes discarded)",
                self.path.display(),
                result.valid_len,
                result.truncated_bytes
            );
        }

        tracing::info!(
            "WAL replay: {} entries recovered ({} SET, {} DEL)",
            result.entries_recovered,
            result.sets,
            result.deletes
        );

        Ok(result)
    }
}
