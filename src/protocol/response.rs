//! Response definitions
//!
//! Represents responses to clients.

use super::ProtocolError;

/// A response to send to a client
///
/// Every variant renders as exactly one line: `+` for success, `-` for errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `+OK`
    Ok,

    /// `+OK <value>`
    Value(Vec<u8>),

    /// `-GET could not find <key> in store`
    NotFound(Vec<u8>),

    /// `-<message>` for a request that could not be parsed
    Error(ProtocolError),
}

impl Response {
    /// Whether this is a `+` response
    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok | Response::Value(_))
    }

    /// Serialize to the wire format, newline included
    pub fn encode(&self) -> Vec<u8> {
        let mut line = Vec::new();
        match self {
            Response::Ok => line.extend_from_slice(b"+OK"),
            Response::Value(value) => {
                line.extend_from_slice(b"+OK ");
                line.extend_from_slice(value);
            }
            Response::NotFound(key) => {
                line.extend_from_slice(b"-GET could not find ");
                line.extend_from_slice(key);
                line.extend_from_slice(b" in store");
            }
            Response::Error(err) => {
                line.push(b'-');
                line.extend_from_slice(err.to_string().as_bytes());
            }
        }
        line.push(b'\n');
        line
    }
}
