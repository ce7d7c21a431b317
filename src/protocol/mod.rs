//! Line Protocol Implementation
//!
//! This module implements the text protocol spoken by linekv clients: one
//! command per `\n`-terminated line, one response line per command.
//!
//! ## Modules
//!
//! - `types`: Defines `Command`, `CommandResult` and response serialization
//! - `parser`: Line framing and the zero-copy command parser
//!
//! ## Example
//!
//! ```
//! use linekv::protocol::{parse_command, split_line, Command, CommandResult};
//! use bytes::{Bytes, BytesMut};
//!
//! // Framing and parsing incoming data
//! let mut buffer = BytesMut::from(&b"GET name\r\nSET"[..]);
//! let line = split_line(&mut buffer).unwrap();
//! assert_eq!(parse_command(line), Command::Get { key: Bytes::from("name") });
//!
//! // Creating responses
//! let response = CommandResult::Found(Bytes::from("alice"));
//! assert_eq!(response.serialize(), b"VALUE: alice\n");
//! ```

pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use parser::{parse_command, split_line};
pub use types::{Command, CommandResult, MALFORMED_MESSAGE};
