//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::TcpStream;
use std::sync::Arc;

use crate::dispatcher::Dispatcher;
use crate::error::{KvError, Result};
use crate::protocol::{read_line, write_response};
use super::{ConnectionCounter, ConnectionGuard};

/// Handles a single client connection
///
/// Requests are processed strictly one at a time: a command, including its
/// WAL fsync, finishes before the next line is read.
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    dispatcher: Arc<Dispatcher>,

    /// Peer address for logging
    peer_addr: String,

    /// Keeps this connection counted until it is dropped
    _guard: ConnectionGuard,
}

impl Connection {
    /// Create a new connection handler and count it as live
    pub fn new(
        stream: TcpStream,
        dispatcher: Arc<Dispatcher>,
        counter: Arc<ConnectionCounter>,
    ) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Counted from here, so a failure below is still released
        let guard = ConnectionGuard::new(counter, peer_addr.clone());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            dispatcher,
            peer_addr,
            _guard: guard,
        })
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Returns `Ok` when the client goes away and `Err` on any other I/O
    /// failure or on a WAL failure (see [`KvError::is_fatal`]).
    pub fn handle(&mut self) -> Result<()> {
        let mut line = Vec::new();

        loop {
            match read_line(&mut self.reader, &mut line) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(KvError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Connection to {} lost: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            }

            let Some(response) = self.dispatcher.dispatch(&line)? else {
                continue;
            };

            tracing::trace!("Responding to {}: {:?}", self.peer_addr, response);

            if let Err(e) = write_response(&mut self.writer, &response) {
                if let KvError::Io(ref io_err) = e {
                    if is_disconnect(io_err.kind()) {
                        tracing::debug!(
                            "Client {} disconnected before response could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
    )
}
