//! Live connection accounting

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Number of connections currently being served
///
/// Shared by the server and every connection thread. Only
/// [`ConnectionGuard`] pairs increments with decrements; the value is
/// informational and never changes protocol behaviour.
#[derive(Debug, Default)]
pub struct ConnectionCounter {
    live: AtomicUsize,
}

impl ConnectionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more connection; returns the new total
    pub fn increment(&self) -> usize {
        self.live.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Count one fewer connection; returns the new total (never below zero)
    pub fn decrement(&self) -> usize {
        match self
            .live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(previous) => previous - 1,
            Err(_) => 0,
        }
    }

    /// Current total
    pub fn snapshot(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }
}

/// Holds one slot of a [`ConnectionCounter`] for as long as it lives
///
/// The slot is released in `Drop`, so it is given back on every exit path of
/// a connection, unwinding included.
#[derive(Debug)]
pub struct ConnectionGuard {
    counter: Arc<ConnectionCounter>,
    peer_addr: String,
}

impl ConnectionGuard {
    pub fn new(counter: Arc<ConnectionCounter>, peer_addr: impl Into<String>) -> Self {
        let peer_addr = peer_addr.into();
        let live = counter.increment();
        tracing::info!("Connection established by client {} ({} live)", peer_addr, live);
        Self { counter, peer_addr }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let live = self.counter.decrement();
        tracing::info!("Connection closed by client {} ({} live)", self.peer_addr, live);
    }
}
