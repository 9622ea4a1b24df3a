//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format
//!
//! Newline-delimited ASCII text. A request is a command name followed by
//! whitespace-separated arguments; every non-blank request gets exactly one
//! response line.
//!
//! ### Commands
//! - `SET <key> <value>` → `+OK`
//! - `GET <key>`         → `+OK <value>` or `-GET could not find <key> in store`
//! - `DEL <key>`         → `+OK`
//!
//! ### Errors
//! - wrong argument count → `-SET expected 2 arguments KEY and VALUE`,
//!   `-GET expected 1 argument KEY`, `-DEL expected 1 argument KEY`
//! - anything else        → `-INVALID COMMAND`

mod codec;
mod command;
mod response;

pub use codec::{read_line, read_response, write_command, write_response, MAX_LINE_LEN};
pub use command::{Command, CommandType, ProtocolError};
pub use response::Response;
