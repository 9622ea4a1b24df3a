//! Command definitions
//!
//! Represents commands from clients and how a request line turns into one.

use thiserror::Error;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Set,
    Get,
    Del,
}

impl CommandType {
    /// Name as written on the wire
    pub fn name(&self) -> &'static str {
        match self {
            CommandType::Set => "SET",
            CommandType::Get => "GET",
            CommandType::Del => "DEL",
        }
    }

    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"SET" => Some(CommandType::Set),
            b"GET" => Some(CommandType::Get),
            b"DEL" => Some(CommandType::Del),
            _ => None,
        }
    }

    fn arity(&self) -> usize {
        match self {
            CommandType::Set => 2,
            CommandType::Get | CommandType::Del => 1,
        }
    }

    fn arity_message(&self) -> &'static str {
        match self {
            CommandType::Set => "SET expected 2 arguments KEY and VALUE",
            CommandType::Get => "GET expected 1 argument KEY",
            CommandType::Del => "DEL expected 1 argument KEY",
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set a key to a value
    Set { key: Vec<u8>, value: Vec<u8> },

    /// Get a value by key
    Get { key: Vec<u8> },

    /// Delete a key
    Del { key: Vec<u8> },
}

/// A request line that does not form a valid command
///
/// These are answered on the connection and never close it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("{}", .0.arity_message())]
    WrongArity(CommandType),

    #[error("INVALID COMMAND")]
    InvalidCommand,

    /// The arguments cannot be written to the WAL without changing meaning
    #[error("{} arguments cannot be logged unambiguously", .0.name())]
    Unloggable(CommandType),
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Set { .. } => CommandType::Set,
            Command::Get { .. } => CommandType::Get,
            Command::Del { .. } => CommandType::Del,
        }
    }

    /// Parse one request line
    ///
    /// The line is split on ASCII whitespace. Returns `Ok(None)` for a blank
    /// line, which gets no response at all. Command names are case-sensitive.
    pub fn parse(line: &[u8]) -> Result<Option<Command>, ProtocolError> {
        let mut parts = line
            .split(|b| b.is_ascii_whitespace())
            .filter(|part| !part.is_empty());

        let Some(name) = parts.next() else {
            return Ok(None);
        };
        let command_type = CommandType::from_name(name).ok_or(ProtocolError::InvalidCommand)?;

        let args: Vec<&[u8]> = parts.collect();
        if args.len() != command_type.arity() {
            return Err(ProtocolError::WrongArity(command_type));
        }

        let command = match command_type {
            CommandType::Set => Command::Set {
                key: args[0].to_vec(),
                value: args[1].to_vec(),
            },
            CommandType::Get => Command::Get {
                key: args[0].to_vec(),
            },
            CommandType::Del => Command::Del {
                key: args[0].to_vec(),
            },
        };
        Ok(Some(command))
    }

    /// Render as a request line, newline included
    pub fn to_line(&self) -> Vec<u8> {
        let mut line = self.command_type().name().as_bytes().to_vec();
        let args: Vec<&[u8]> = match self {
            Command::Set { key, value } => vec![key.as_slice(), value.as_slice()],
            Command::Get { key } | Command::Del { key } => vec![key.as_slice()],
        };
        for arg in args {
            line.push(b' ');
            line.extend_from_slice(arg);
        }
        line.push(b'\n');
        line
    }
}
