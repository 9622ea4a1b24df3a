//! Tests for the Dispatcher
//!
//! These tests verify:
//! - Request lines produce the documented responses
//! - Mutations reach the WAL before the store
//! - A WAL failure leaves the store untouched
//! - Opening from a config replays the WAL

use std::sync::Arc;

use parking_lot::Mutex;
use shardkv::config::{Config, ReplayPolicy};
use shardkv::error::{KvError, Result};
use shardkv::protocol::{Command, Response};
use shardkv::store::{HashMapStore, KeyValueStore};
use shardkv::wal::{LogEntry, NoopWal, RecoveryResult, WriteAheadLog};
use shardkv::Dispatcher;
use tempfile::TempDir;

// =============================================================================
// Test Doubles
// =============================================================================

/// Records each entry together with what the store held for its key at the
/// moment the entry was logged
struct SnoopingWal {
    store: Arc<dyn KeyValueStore>,
    seen: Mutex<Vec<(LogEntry, Option<Vec<u8>>)>>,
}

impl WriteAheadLog for SnoopingWal {
    fn log(&self, entry: &LogEntry) -> Result<()> {
        let before = self.store.get(entry.key());
        self.seen.lock().push((entry.clone(), before));
        Ok(())
    }

    fn rebuild(&self, _store: &dyn KeyValueStore) -> Result<RecoveryResult> {
        Ok(RecoveryResult::default())
    }
}

struct FailingWal;

impl WriteAheadLog for FailingWal {
    fn log(&self, _entry: &LogEntry) -> Result<()> {
        Err(KvError::WalWrite("disk on fire".to_string()))
    }

    fn rebuild(&self, _store: &dyn KeyValueStore) -> Result<RecoveryResult> {
        Ok(RecoveryResult::default())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn memory_dispatcher() -> Dispatcher {
    Dispatcher::new(Arc::new(HashMapStore::new()), Arc::new(NoopWal::new()))
}

fn reply(dispatcher: &Dispatcher, line: &str) -> String {
    let response = dispatcher
        .dispatch(line.as_bytes())
        .unwrap()
        .expect("expected a response");
    String::from_utf8(response.encode()).unwrap()
}

// =============================================================================
// Response Tests
// =============================================================================

#[test]
fn test_set_then_get() {
    let dispatcher = memory_dispatcher();

    assert_eq!(reply(&dispatcher, "SET foo bar"), "+OK\n");
    assert_eq!(reply(&dispatcher, "GET foo"), "+OK bar\n");
}

#[test]
fn test_get_missing() {
    let dispatcher = memory_dispatcher();
    assert_eq!(
        reply(&dispatcher, "GET missing"),
        "-GET could not find missing in store\n"
    );
}

#[test]
fn test_del_then_get() {
    let dispatcher = memory_dispatcher();

    reply(&dispatcher, "SET foo bar");
    assert_eq!(reply(&dispatcher, "DEL foo"), "+OK\n");
    assert_eq!(
        reply(&dispatcher, "GET foo"),
        "-GET could not find foo in store\n"
    );
}

#[test]
fn test_del_missing_is_ok() {
    let dispatcher = memory_dispatcher();
    assert_eq!(reply(&dispatcher, "DEL nothing"), "+OK\n");
}

#[test]
fn test_protocol_errors() {
    let dispatcher = memory_dispatcher();

    assert_eq!(reply(&dispatcher, "FROB x"), "-INVALID COMMAND\n");
    assert_eq!(
        reply(&dispatcher, "SET onlykey"),
        "-SET expected 2 arguments KEY and VALUE\n"
    );
    assert_eq!(reply(&dispatcher, "GET"), "-GET expected 1 argument KEY\n");
    assert_eq!(reply(&dispatcher, "DEL a b"), "-DEL expected 1 argument KEY\n");
}

#[test]
fn test_blank_line_has_no_response() {
    let dispatcher = memory_dispatcher();
    assert_eq!(dispatcher.dispatch(b"").unwrap(), None);
    assert_eq!(dispatcher.dispatch(b"  \r\n").unwrap(), None);
}

#[test]
fn test_bad_arity_does_not_mutate() {
    let dispatcher = memory_dispatcher();

    reply(&dispatcher, "SET a b c");
    assert!(dispatcher.store().is_empty());
}

// =============================================================================
// Ordering Tests
// =============================================================================

#[test]
fn test_wal_is_written_before_store() {
    let store: Arc<dyn KeyValueStore> = Arc::new(HashMapStore::new());
    let wal = Arc::new(SnoopingWal {
        store: Arc::clone(&store),
        seen: Mutex::new(Vec::new()),
    });
    let dispatcher = Dispatcher::new(Arc::clone(&store), wal.clone());

    reply(&dispatcher, "SET k v1");
    reply(&dispatcher, "SET k v2");
    reply(&dispatcher, "GET k");
    reply(&dispatcher, "DEL k");

    let seen = wal.seen.lock();
    assert_eq!(
        *seen,
        vec![
            (LogEntry::set("k", "v1"), None),
            (LogEntry::set("k", "v2"), Some(b"v1".to_vec())),
            (LogEntry::delete("k"), Some(b"v2".to_vec())),
        ]
    );
    assert_eq!(store.get(b"k"), None);
}

#[test]
fn test_wal_failure_leaves_store_untouched() {
    let store: Arc<dyn KeyValueStore> = Arc::new(HashMapStore::new());
    store.set(b"keep".to_vec(), b"me".to_vec());
    let dispatcher = Dispatcher::new(Arc::clone(&store), Arc::new(FailingWal));

    let err = dispatcher.dispatch(b"SET new value").unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(store.get(b"new"), None);

    let err = dispatcher
        .execute(Command::Del { key: b"keep".to_vec() })
        .unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(store.get(b"keep"), Some(b"me".to_vec()));

    // Reads never touch the WAL
    assert_eq!(
        dispatcher.dispatch(b"GET keep").unwrap(),
        Some(Response::Value(b"me".to_vec()))
    );
}

// =============================================================================
// Open / Replay Tests
// =============================================================================

#[test]
fn test_open_replays_previous_session() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .wal_path(temp_dir.path().join("wal"))
        .shard_count(4)
        .build();

    {
        let dispatcher = Dispatcher::open(&config).unwrap();
        reply(&dispatcher, "SET a 1");
        reply(&dispatcher, "SET a 2");
        reply(&dispatcher, "DEL b");
        reply(&dispatcher, "SET b 3");
        reply(&dispatcher, "SET gone x");
        reply(&dispatcher, "DEL gone");
    }

    for _ in 0..2 {
        let dispatcher = Dispatcher::open(&config).unwrap();
        assert_eq!(dispatcher.store().len(), 2);
        assert_eq!(reply(&dispatcher, "GET a"), "+OK 2\n");
        assert_eq!(reply(&dispatcher, "GET b"), "+OK 3\n");
        assert_eq!(
            reply(&dispatcher, "GET gone"),
            "-GET could not find gone in store\n"
        );
    }
}

#[test]
fn test_open_without_persistence_starts_empty() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .wal_path(temp_dir.path().join("wal"))
        .persistence_enabled(false)
        .build();

    {
        let dispatcher = Dispatcher::open(&config).unwrap();
        reply(&dispatcher, "SET a 1");
    }

    let dispatcher = Dispatcher::open(&config).unwrap();
    assert!(dispatcher.store().is_empty());
}

#[test]
fn test_ambiguous_set_is_rejected_not_acknowledged() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .wal_path(temp_dir.path().join("wal"))
        .build();

    {
        let dispatcher = Dispatcher::open(&config).unwrap();
        assert_eq!(
            reply(&dispatcher, "SET 10abcdefgh x"),
            "-SET arguments cannot be logged unambiguously\n"
        );
        assert_eq!(
            reply(&dispatcher, "GET 10abcdefgh"),
            "-GET could not find 10abcdefgh in store\n"
        );
        assert!(dispatcher.store().is_empty());

        assert_eq!(reply(&dispatcher, "SET 0 abcdefgh1x"), "+OK\n");
    }

    let dispatcher = Dispatcher::open(&config).unwrap();
    assert_eq!(dispatcher.store().len(), 1);
    assert_eq!(reply(&dispatcher, "GET 0"), "+OK abcdefgh1x\n");
    assert_eq!(
        reply(&dispatcher, "GET 10abcdefgh"),
        "-GET could not find 10abcdefgh in store\n"
    );
}

#[test]
fn test_open_rejects_invalid_config() {
    let config = Config::builder().shard_count(0).build();
    assert!(matches!(
        Dispatcher::open(&config),
        Err(KvError::Config(_))
    ));
}

#[test]
fn test_open_fails_on_strict_torn_tail() {
    let temp_dir = TempDir::new().unwrap();
    let wal_path = temp_dir.path().join("wal");
    std::fs::write(&wal_path, b"3SET1a11\n3SET1b").unwrap();

    let strict = Config::builder()
        .wal_path(&wal_path)
        .replay_policy(ReplayPolicy::Strict)
        .build();
    assert!(matches!(
        Dispatcher::open(&strict),
        Err(KvError::WalCorruption { .. })
    ));

    let lenient = Config::builder().wal_path(&wal_path).build();
    let dispatcher = Dispatcher::open(&lenient).unwrap();
    assert_eq!(reply(&dispatcher, "GET a"), "+OK 1\n");
    assert_eq!(dispatcher.store().len(), 1);
}
