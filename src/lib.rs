//! # shardkv
//!
//! A single-node, in-memory key-value store with:
//! - Write-Ahead Logging (WAL) with an fsync per mutation
//! - Crash recovery with partial write handling
//! - Plain or sharded reader/writer-locked maps
//! - Line-oriented TCP protocol, one thread per client
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │               (one thread per connection)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Dispatcher                               │
//! │            (WAL first, then store, per mutation)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │     WAL     │          │    Store    │
//!   │(append+sync)│          │ (RwLock per │
//!   └─────────────┘          │    shard)   │
//!                            └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod wal;
pub mod protocol;
pub mod dispatcher;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::{Config, ReplayPolicy};
pub use dispatcher::Dispatcher;
pub use store::{HashFunction, KeyValueStore};
pub use wal::{LogEntry, WriteAheadLog};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of shardkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
