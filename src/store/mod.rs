//! Store Module
//!
//! Concurrent in-memory key-value maps.
//!
//! ## Responsibilities
//! - Fast reads and writes in memory
//! - Reader/writer locking, either over the whole map or per shard
//! - Route keys to shards with a fixed, pluggable hash
//!
//! ## Variants
//! - [`HashMapStore`]: one `RwLock<HashMap>`. Readers run in parallel, every
//!   writer excludes everyone else.
//! - [`ShardedStore`]: N independently locked maps. Operations on different
//!   shards never contend. The shard count is fixed at construction.

mod hashmap;
mod partitioner;
mod sharded;

use std::sync::Arc;

use crate::config::Config;

pub use hashmap::HashMapStore;
pub use partitioner::{HashFunction, HashPartitioner};
pub use sharded::ShardedStore;

/// The capability every store variant provides
///
/// All methods take `&self`; implementations synchronize internally so a
/// single instance can be shared by every connection.
pub trait KeyValueStore: Send + Sync {
    /// Look up a key. No side effects.
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Insert or overwrite a key.
    fn set(&self, key: Vec<u8>, value: Vec<u8>);

    /// Remove a key. Removing an absent key is a no-op.
    fn delete(&self, key: &[u8]);

    /// Number of live keys
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the store variant selected by the config
///
/// A shard count of 1 selects the plain store.
pub fn open_store(config: &Config) -> Arc<dyn KeyValueStore> {
    if config.shard_count > 1 {
        tracing::debug!(
            "Using sharded store: {} shards, {:?} hash",
            config.shard_count,
            config.hash_function
        );
        Arc::new(ShardedStore::new(config.shard_count, config.hash_function))
    } else {
        tracing::debug!(
            "Using plain store with initial capacity {}",
            config.initial_capacity
        );
        Arc::new(HashMapStore::with_capacity(config.initial_capacity))
    }
}
