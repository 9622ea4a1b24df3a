//! Protocol Tests
//!
//! Tests verify:
//! - Request line parsing and arity checking
//! - Blank lines produce no command
//! - Exact response line rendering
//! - Framing helpers over in-memory streams

use std::io::Cursor;

use shardkv::protocol::{
    read_response, write_command, write_response, Command, CommandType, ProtocolError, Response,
};

// =============================================================================
// Parsing Tests
// =============================================================================

#[test]
fn test_parse_set() {
    assert_eq!(
        Command::parse(b"SET foo bar\n"),
        Ok(Some(Command::Set {
            key: b"foo".to_vec(),
            value: b"bar".to_vec()
        }))
    );
}

#[test]
fn test_parse_get_and_del() {
    assert_eq!(
        Command::parse(b"GET foo"),
        Ok(Some(Command::Get { key: b"foo".to_vec() }))
    );
    assert_eq!(
        Command::parse(b"DEL foo\r\n"),
        Ok(Some(Command::Del { key: b"foo".to_vec() }))
    );
}

#[test]
fn test_parse_collapses_whitespace() {
    assert_eq!(
        Command::parse(b"  SET\t key   value  \r\n"),
        Ok(Some(Command::Set {
            key: b"key".to_vec(),
            value: b"value".to_vec()
        }))
    );
}

#[test]
fn test_parse_blank_lines() {
    assert_eq!(Command::parse(b""), Ok(None));
    assert_eq!(Command::parse(b"\n"), Ok(None));
    assert_eq!(Command::parse(b"   \t \r\n"), Ok(None));
}

#[test]
fn test_parse_wrong_arity() {
    let cases: [(&[u8], CommandType); 7] = [
        (b"SET", CommandType::Set),
        (b"SET foo", CommandType::Set),
        (b"SET foo bar baz", CommandType::Set),
        (b"GET", CommandType::Get),
        (b"GET a b", CommandType::Get),
        (b"DEL", CommandType::Del),
        (b"DEL a b", CommandType::Del),
    ];

    for (line, command_type) in cases {
        assert_eq!(
            Command::parse(line),
            Err(ProtocolError::WrongArity(command_type)),
            "{}",
            String::from_utf8_lossy(line)
        );
    }
}

#[test]
fn test_parse_unknown_command() {
    assert_eq!(Command::parse(b"FROB x"), Err(ProtocolError::InvalidCommand));
    assert_eq!(Command::parse(b"set foo bar"), Err(ProtocolError::InvalidCommand));
    assert_eq!(Command::parse(b"PING"), Err(ProtocolError::InvalidCommand));
}

#[test]
fn test_command_type_names() {
    assert_eq!(CommandType::Set.name(), "SET");
    assert_eq!(CommandType::Get.name(), "GET");
    assert_eq!(CommandType::Del.name(), "DEL");
}

// =============================================================================
// Response Tests
// =============================================================================

#[test]
fn test_response_lines() {
    assert_eq!(Response::Ok.encode(), b"+OK\n");
    assert_eq!(Response::Value(b"bar".to_vec()).encode(), b"+OK bar\n");
    assert_eq!(
        Response::NotFound(b"missing".to_vec()).encode(),
        b"-GET could not find missing in store\n"
    );
    assert_eq!(
        Response::Error(ProtocolError::InvalidCommand).encode(),
        b"-INVALID COMMAND\n"
    );
}

#[test]
fn test_arity_error_lines() {
    assert_eq!(
        Response::Error(ProtocolError::WrongArity(CommandType::Set)).encode(),
        b"-SET expected 2 arguments KEY and VALUE\n"
    );
    assert_eq!(
        Response::Error(ProtocolError::WrongArity(CommandType::Get)).encode(),
        b"-GET expected 1 argument KEY\n"
    );
    assert_eq!(
        Response::Error(ProtocolError::WrongArity(CommandType::Del)).encode(),
        b"-DEL expected 1 argument KEY\n"
    );
}

#[test]
fn test_unloggable_error_line() {
    assert_eq!(
        Response::Error(ProtocolError::Unloggable(CommandType::Set)).encode(),
        b"-SET arguments cannot be logged unambiguously\n"
    );
}

#[test]
fn test_response_is_ok() {
    assert!(Response::Ok.is_ok());
    assert!(Response::Value(Vec::new()).is_ok());
    assert!(!Response::NotFound(Vec::new()).is_ok());
    assert!(!Response::Error(ProtocolError::InvalidCommand).is_ok());
}

// =============================================================================
// Stream Helper Tests
// =============================================================================

#[test]
fn test_command_line_parses_back() {
    let commands = vec![
        Command::Set {
            key: b"k".to_vec(),
            value: b"v".to_vec(),
        },
        Command::Get { key: b"k".to_vec() },
        Command::Del { key: b"k".to_vec() },
    ];

    for command in commands {
        let mut out = Vec::new();
        write_command(&mut out, &command).unwrap();
        assert_eq!(out.last(), Some(&b'\n'));
        assert_eq!(Command::parse(&out), Ok(Some(command)));
    }
}

#[test]
fn test_write_then_read_response() {
    let mut out = Vec::new();
    write_response(&mut out, &Response::Value(b"hello".to_vec())).unwrap();
    write_response(&mut out, &Response::Ok).unwrap();

    let mut reader = Cursor::new(out);
    assert_eq!(read_response(&mut reader).unwrap(), "+OK hello");
    assert_eq!(read_response(&mut reader).unwrap(), "+OK");
    assert!(read_response(&mut reader).is_err());
}
