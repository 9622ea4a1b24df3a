//! WAL Entry definitions
//!
//! Defines the structure and byte encoding of individual WAL records.
//!
//! ## Record Format
//! ```text
//! SET: <len(op)><op><len(key)><key><len(value)><value>\n   3SET3foo3bar\n
//! DEL: <len(op)><op><len(key)><key>\n                      3DEL3foo\n
//! ```
//! Lengths are decimal with no fixed width and no leading zeros.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::store::KeyValueStore;

const SET_OP: &[u8] = b"SET";
const DEL_OP: &[u8] = b"DEL";
const SET_HEADER: &[u8] = b"3SET";
const DEL_HEADER: &[u8] = b"3DEL";
const TERMINATOR: u8 = b'\n';

/// Longest length prefix considered; more digits cannot fit in a u64
const MAX_LEN_DIGITS: usize = 19;

/// A single mutation recorded in the WAL
///
/// Owns copies of its key and value, so it never aliases a caller's buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    /// Upsert a key
    Set { key: Vec<u8>, value: Vec<u8> },

    /// Remove a key
    Delete { key: Vec<u8> },
}

/// Why a record could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The input ends before the record is complete
    #[error("record is incomplete")]
    Incomplete,

    /// The bytes cannot start a valid record
    #[error("malformed record: {0}")]
    Malformed(String),
}

impl LogEntry {
    pub fn set(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        LogEntry::Set {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        LogEntry::Delete { key: key.into() }
    }

    /// Operation name as written to the log
    pub fn op(&self) -> &'static str {
        match self {
            LogEntry::Set { .. } => "SET",
            LogEntry::Delete { .. } => "DEL",
        }
    }

    pub fn key(&self) -> &[u8] {
        match self {
            LogEntry::Set { key, .. } | LogEntry::Delete { key } => key,
        }
    }

    /// Serialize to the on-disk record, terminator included
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len_hint());
        match self {
            LogEntry::Set { key, value } => {
                put_field(&mut buf, SET_OP);
                put_field(&mut buf, key);
                put_field(&mut buf, value);
            }
            LogEntry::Delete { key } => {
                put_field(&mut buf, DEL_OP);
                put_field(&mut buf, key);
            }
        }
        buf.put_u8(TERMINATOR);
        buf.freeze()
    }

    fn encoded_len_hint(&self) -> usize {
        // op field plus a generous allowance for each length prefix
        match self {
            LogEntry::Set { key, value } => 4 + key.len() + value.len() + 2 * 20 + 1,
            LogEntry::Delete { key } => 4 + key.len() + 20 + 1,
        }
    }

    /// Decode the record at the start of `buf`
    ///
    /// Returns the entry and the number of bytes it occupied. A field may
    /// itself begin with digits, so every prefix of a digit run is tried as
    /// the length, shortest first, and the first one that yields a complete
    /// record wins.
    ///
    /// The format is not injective for some digit-leading fields:
    /// `SET 10abcdefgh x` and `SET 0 abcdefgh1x` share the bytes
    /// `3SET1010abcdefgh1x\n`, and decoding yields the second. Writers must
    /// refuse records for which [`LogEntry::decodes_to_self`] is false.
    pub fn decode(buf: &[u8]) -> Result<(LogEntry, usize), DecodeError> {
        let (field_count, is_set) = if buf.starts_with(SET_HEADER) {
            (2, true)
        } else if buf.starts_with(DEL_HEADER) {
            (1, false)
        } else if SET_HEADER.starts_with(buf) || DEL_HEADER.starts_with(buf) {
            return Err(DecodeError::Incomplete);
        } else {
            return Err(DecodeError::Malformed("unknown operation".to_string()));
        };

        let mut fields = Vec::with_capacity(field_count);
        let consumed = read_fields(buf, SET_HEADER.len(), field_count, &mut fields)?;

        let entry = if is_set {
            LogEntry::set(fields[0], fields[1])
        } else {
            LogEntry::delete(fields[0])
        };
        Ok((entry, consumed))
    }

    /// Whether `encoded` (this entry's encoding) decodes back to exactly this
    /// entry
    pub fn decodes_to_self(&self, encoded: &[u8]) -> bool {
        matches!(
            LogEntry::decode(encoded),
            Ok((ref decoded, consumed)) if decoded == self && consumed == encoded.len()
        )
    }

    /// Replay this mutation against a store
    pub fn apply_to(self, store: &dyn KeyValueStore) {
        match self {
            LogEntry::Set { key, value } => store.set(key, value),
            LogEntry::Delete { key } => store.delete(&key),
        }
    }
}

fn put_field(buf: &mut BytesMut, field: &[u8]) {
    buf.put_slice(field.len().to_string().as_bytes());
    buf.put_slice(field);
}

/// Read `remaining` length-prefixed fields starting at `pos`, then the
/// terminator. Returns the offset just past the terminator.
fn read_fields<'a>(
    buf: &'a [u8],
    pos: usize,
    remaining: usize,
    fields: &mut Vec<&'a [u8]>,
) -> Result<usize, DecodeError> {
    if remaining == 0 {
        return match buf.get(pos) {
            Some(&TERMINATOR) => Ok(pos + 1),
            Some(byte) => Err(DecodeError::Malformed(format!(
                "expected record terminator at byte {pos}, found 0x{byte:02x}"
            ))),
            None => Err(DecodeError::Incomplete),
        };
    }

    let digits = buf[pos..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return match buf.get(pos) {
            Some(byte) => Err(DecodeError::Malformed(format!(
                "expected field length at byte {pos}, found 0x{byte:02x}"
            ))),
            None => Err(DecodeError::Incomplete),
        };
    }

    // The digit run reaching the end of input could still be growing
    let mut outcome = if pos + digits == buf.len() {
        DecodeError::Incomplete
    } else {
        DecodeError::Malformed(format!("no valid field length at byte {pos}"))
    };

    // The encoder never writes leading zeros, so "0..." can only mean zero
    let widest = if buf[pos] == b'0' {
        1
    } else {
        digits.min(MAX_LEN_DIGITS)
    };

    for width in 1..=widest {
        let Some(len) = parse_len(&buf[pos..pos + width]) else {
            break;
        };
        let start = pos + width;
        let end = match start.checked_add(len) {
            Some(end) if end <= buf.len() => end,
            _ => {
                outcome = DecodeError::Incomplete;
                continue;
            }
        };

        fields.push(&buf[start..end]);
        match read_fields(buf, end, remaining - 1, fields) {
            Ok(next) => return Ok(next),
            Err(err) => {
                fields.pop();
                if err == DecodeError::Incomplete {
                    outcome = err;
                }
            }
        }
    }

    Err(outcome)
}

fn parse_len(digits: &[u8]) -> Option<usize> {
    digits.iter().try_fold(0usize, |acc, &d| {
        acc.checked_mul(10)?.checked_add(usize::from(d - b'0'))
    })
}
