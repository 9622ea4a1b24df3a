//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread
//! - One thread per connection, commands run sequentially within it
//! - Commands routed through the Dispatcher

mod connection;
mod counter;
mod server;

pub use connection::Connection;
pub use counter::{ConnectionCounter, ConnectionGuard};
pub use server::Server;
