//! TCP Server
//!
//! Accepts connections and hands each one to its own thread.

use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use super::{Connection, ConnectionCounter};

/// TCP server for shardkv
///
/// The dispatcher handed in must already have replayed the WAL (see
/// [`Dispatcher::open`]), so no client can observe a partially rebuilt store.
pub struct Server {
    config: Config,

    dispatcher: Arc<Dispatcher>,

    /// Live connections, shared with every connection thread
    connections: Arc<ConnectionCounter>,
}

impl Server {
    /// Create a new server with the given config and dispatcher
    pub fn new(config: Config, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            config,
            dispatcher,
            connections: Arc::new(ConnectionCounter::new()),
        }
    }

    /// Bind the configured address and serve forever (blocking)
    ///
    /// Only returns on a startup failure such as the port being taken.
    pub fn start(&self) -> Result<()> {
        tracing::info!("Starting shardkv on {}", self.config.listen_addr());
        let listener = TcpListener::bind(self.config.listen_addr())?;
        self.serve(listener)
    }

    /// Serve connections from an already bound listener (blocking)
    pub fn serve(&self, listener: TcpListener) -> Result<()> {
        tracing::info!("Server started, listening on {}", listener.local_addr()?);

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => self.spawn_connection(stream),
                Err(e) => tracing::warn!("Could not accept connection: {}", e),
            }
        }

        Ok(())
    }

    /// Live connection counter
    pub fn connections(&self) -> Arc<ConnectionCounter> {
        Arc::clone(&self.connections)
    }

    fn spawn_connection(&self, stream: TcpStream) {
        let dispatcher = Arc::clone(&self.dispatcher);
        let counter = Arc::clone(&self.connections);

        let spawned = thread::Builder::new()
            .name("shardkv-conn".to_string())
            .spawn(move || {
                let mut connection = match Connection::new(stream, dispatcher, counter) {
                    Ok(connection) => connection,
                    Err(e) => {
                        tracing::warn!("Could not set up connection: {}", e);
                        return;
                    }
                };

                if let Err(e) = connection.handle() {
                    if e.is_fatal() {
                        // Mutations can no longer be made durable
                        tracing::error!("Unrecoverable WAL failure, shutting down: {}", e);
                        std::process::exit(1);
                    }
                    tracing::warn!("Connection {} ended with error: {}", connection.peer_addr(), e);
                }
            });

        if let Err(e) = spawned {
            tracing::warn!("Could not spawn connection thread: {}", e);
        }
    }
}
