//! Key to shard routing

use std::fmt;

/// Hash used to pick a key's shard
///
/// The choice only changes how keys spread over shards, never what the store
/// returns.
#[derive(Clone, Copy)]
pub enum HashFunction {
    /// Sum of the key's bytes. Weak; useful for tests and demos.
    SimpleSum,

    /// DJB2 (`h = h * 33 + c`, seed 5381, 32-bit wrapping)
    Djb2,

    /// CRC-32 (IEEE polynomial)
    Crc32,

    /// Caller-supplied hash. May return negative values.
    Custom(fn(&[u8]) -> i64),
}

impl HashFunction {
    /// Hash a key
    pub fn hash(&self, key: &[u8]) -> i64 {
        match self {
            HashFunction::SimpleSum => simple_sum(key),
            HashFunction::Djb2 => djb2(key),
            HashFunction::Crc32 => i64::from(crc32fast::hash(key)),
            HashFunction::Custom(f) => f(key),
        }
    }
}

impl fmt::Debug for HashFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashFunction::SimpleSum => f.write_str("SimpleSum"),
            HashFunction::Djb2 => f.write_str("Djb2"),
            HashFunction::Crc32 => f.write_str("Crc32"),
            HashFunction::Custom(_) => f.write_str("Custom"),
        }
    }
}

fn simple_sum(key: &[u8]) -> i64 {
    key.iter().fold(0i64, |sum, &b| sum.wrapping_add(i64::from(b)))
}

fn djb2(key: &[u8]) -> i64 {
    let h = key
        .iter()
        .fold(5381u32, |h, &b| h.wrapping_mul(33).wrapping_add(u32::from(b)));
    i64::from(h)
}

/// Maps keys to shard indices in `[0, shard_count)`
///
/// Stateless apart from the hash and the shard count, both fixed for the
/// lifetime of the partitioner, so a key always lands on the same shard.
#[derive(Debug, Clone, Copy)]
pub struct HashPartitioner {
    hash: HashFunction,
    shard_count: usize,
}

impl HashPartitioner {
    /// Create a partitioner. A shard count of 0 is treated as 1.
    pub fn new(hash: HashFunction, shard_count: usize) -> Self {
        Self {
            hash,
            shard_count: shard_count.max(1),
        }
    }

    /// Shard index for `key`
    ///
    /// The double modulo keeps the index in range for negative hashes.
    pub fn shard_for(&self, key: &[u8]) -> usize {
        let n = self.shard_count as i64;
        let h = self.hash.hash(key);
        (((h % n) + n) % n) as usize
    }

    pub fn shard_count(&self) -> usize {
        self.shard_count
    }
}
