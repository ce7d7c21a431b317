//! Protocol Data Types
//!
//! This module defines the typed request ([`Command`]) and outcome
//! ([`CommandResult`]) of the line protocol, plus the wire encoding of
//! outcomes.
//!
//! ## Protocol Format
//!
//! One request per line, one response per line, both terminated by `\n`:
//!
//! ```text
//! GET <key>              VALUE: <value>    (hit)
//! SET <key> <value>      NOT_FOUND         (GET miss, DEL of an absent key)
//! DEL <key>              OK                (SET)
//!                        DELETED           (DEL removed a key)
//!                        ERROR: <message>  (malformed line)
//! ```

use bytes::Bytes;
use std::fmt;

/// Line terminator used for responses.
pub const LF: u8 = b'\n';

/// Message sent back for any line that does not parse.
pub const MALFORMED_MESSAGE: &str =
    "malformed command, expected GET <key> | SET <key> <value> | DEL <key>";

/// Response prefixes and fixed responses.
pub mod reply {
    pub const VALUE: &[u8] = b"VALUE: ";
    pub const NOT_FOUND: &[u8] = b"NOT_FOUND";
    pub const OK: &[u8] = b"OK";
    pub const DELETED: &[u8] = b"DELETED";
    pub const ERROR: &[u8] = b"ERROR: ";
}

/// One parsed request line.
///
/// Keys never contain whitespace and are never empty. Values are the rest
/// of the line after the key and may contain spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Get { key: Bytes },
    Set { key: Bytes, value: Bytes },
    Del { key: Bytes },
    /// A line that matched no verb or had the wrong argument count.
    /// Holds the original line text.
    Malformed(Bytes),
}

impl Command {
    /// Name of the command verb, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Get { .. } => "GET",
            Command::Set { .. } => "SET",
            Command::Del { .. } => "DEL",
            Command::Malformed(_) => "MALFORMED",
        }
    }
}

/// The outcome of executing a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// GET hit
    Found(Bytes),
    /// GET miss, or DEL on an absent key
    NotFound,
    /// DEL removed an existing key
    Deleted,
    /// SET succeeded
    Stored,
    /// The request line was malformed
    ParseError(String),
}

impl CommandResult {
    /// Serializes the result to its response line, including the terminator.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize_into(&mut buf);
        buf
    }

    /// Serializes the result into an existing buffer.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) {
        match self {
            CommandResult::Found(value) => {
                buf.extend_from_slice(reply::VALUE);
                buf.extend_from_slice(value);
            }
            CommandResult::NotFound => buf.extend_from_slice(reply::NOT_FOUND),
            CommandResult::Deleted => buf.extend_from_slice(reply::DELETED),
            CommandResult::Stored => buf.extend_from_slice(reply::OK),
            CommandResult::ParseError(message) => {
                buf.extend_from_slice(reply::ERROR);
                buf.extend_from_slice(message.as_bytes());
            }
        }
        buf.push(LF);
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CommandResult::ParseError(_))
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandResult::Found(value) => match std::str::from_utf8(value) {
                Ok(s) => write!(f, "VALUE: {}", s),
                Err(_) => write!(f, "VALUE: (binary data, {} bytes)", value.len()),
            },
            CommandResult::NotFound => write!(f, "NOT_FOUND"),
            CommandResult::Deleted => write!(f, "DELETED"),
            CommandResult::Stored => write!(f, "OK"),
            CommandResult::ParseError(message) => write!(f, "ERROR: {}", message),
        }
    }
}
