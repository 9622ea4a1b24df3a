//! Plain store implementation
//!
//! HashMap with a single RwLock for concurrency.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::KeyValueStore;

/// Single-lock in-memory store
///
/// Best suited for small maps or low-contention workloads. For many
/// concurrent writers prefer [`ShardedStore`](super::ShardedStore).
pub struct HashMapStore {
    data: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
}

impl HashMapStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty store pre-sized for `capacity` keys
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: RwLock::new(HashMap::with_capacity(capacity)),
        }
    }
}

impl Default for HashMapStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for HashMapStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.data.read().get(key).cloned()
    }

    fn set(&self, key: Vec<u8>, value: Vec<u8>) {
        self.data.write().insert(key, value);
    }

    fn delete(&self, key: &[u8]) {
        self.data.write().remove(key);
    }

    fn len(&self) -> usize {
        self.data.read().len()
    }
}
