//! Protocol codec
//!
//! Line framing for the wire protocol.
//!
//! ## Wire Format
//! ```text
//! request:  <COMMAND> [arg1] [arg2]\n
//! response: +OK[ <value>]\n  |  -<message>\n
//! ```

use std::io::{self, BufRead, Read, Write};

use crate::error::{KvError, Result};
use super::{Command, Response};

/// Longest request line accepted (64 KiB)
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Read one line into `buf`, replacing its contents
///
/// Returns `Ok(false)` at end of stream. A final line without a newline is
/// still returned. Lines longer than [`MAX_LINE_LEN`] fail with
/// `InvalidData`.
pub fn read_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> Result<bool> {
    buf.clear();
    let limit = MAX_LINE_LEN as u64 + 1;
    let read = reader.by_ref().take(limit).read_until(b'\n', buf)?;

    if read == 0 {
        return Ok(false);
    }
    if buf.last() != Some(&b'\n') && buf.len() > MAX_LINE_LEN {
        return Err(KvError::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("request line exceeds {MAX_LINE_LEN} bytes"),
        )));
    }
    Ok(true)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    writer.write_all(&response.encode())?;
    writer.flush()?;
    Ok(())
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    writer.write_all(&command.to_line())?;
    writer.flush()?;
    Ok(())
}

/// Read a response line, newline stripped
pub fn read_response<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut buf = Vec::new();
    if !read_line(reader, &mut buf)? {
        return Err(KvError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed before a response arrived",
        )));
    }
    while matches!(buf.last(), Some(b'\n' | b'\r')) {
        buf.pop();
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
