//! Sharded store implementation
//!
//! Splits the keyspace over independently locked maps to reduce lock
//! contention under concurrent access.

use std::collections::HashMap;

use crossbeam::utils::CachePadded;
use parking_lot::RwLock;

use super::{HashFunction, HashPartitioner, KeyValueStore};

type Shard = RwLock<HashMap<Vec<u8>, Vec<u8>>>;

/// Store made of a fixed number of `(RwLock, HashMap)` shards
///
/// ## Concurrency
/// - Each operation locks only the shard its key routes to
/// - Operations on different shards proceed fully in parallel
/// - No ordering is guaranteed across shards
///
/// Shards are never added or removed after construction.
pub struct ShardedStore {
    /// One slot per shard, cache padded so neighbouring locks do not share a line
    shards: Vec<CachePadded<Shard>>,

    partitioner: HashPartitioner,
}

impl ShardedStore {
    /// Create a store with `shard_count` shards (at least one)
    pub fn new(shard_count: usize, hash: HashFunction) -> Self {
        let partitioner = HashPartitioner::new(hash, shard_count);
        let shards = (0..partitioner.shard_count())
            .map(|_| CachePadded::new(RwLock::new(HashMap::new())))
            .collect();

        Self { shards, partitioner }
    }

    #[inline]
    fn shard(&self, key: &[u8]) -> &Shard {
        &self.shards[self.partitioner.shard_for(key)]
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Shard index `key` routes to
    pub fn shard_of(&self, key: &[u8]) -> usize {
        self.partitioner.shard_for(key)
    }

    /// Number of keys held by each shard, in shard order
    pub fn shard_sizes(&self) -> Vec<usize> {
        self.shards.iter().map(|s| s.read().len()).collect()
    }
}

impl KeyValueStore for ShardedStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.shard(key).read().get(key).cloned()
    }

    fn set(&self, key: Vec<u8>, value: Vec<u8>) {
        self.shard(&key).write().insert(key, value);
    }

    fn delete(&self, key: &[u8]) {
        self.shard(key).write().remove(key);
    }

    fn len(&self) -> usize {
        self.shards.iter().map(|s| s.read().len()).sum()
    }
}
