//! Line Framing and Command Parser
//!
//! Two steps turn socket bytes into a [`Command`]:
//!
//! 1. [`split_line`] takes one `\n`-terminated line off the front of the
//!    connection buffer (stripping an optional `\r`), or reports that no
//!    complete line is buffered yet.
//! 2. [`parse_command`] turns that line into a typed command.
//!
//! ## Grammar
//!
//! Verbs are case-sensitive; tokens are separated by runs of spaces or tabs.
//!
//! ```text
//! GET <key>
//! SET <key> <value>     value = remainder of the line after the key
//! DEL <key>
//! ```
//!
//! Parsing never fails: anything that does not match the grammar becomes
//! [`Command::Malformed`] so that one bad line never ends the connection.
//! Keys and values are `Bytes` slices of the line, so parsing does not copy.

use crate::protocol::types::{Command, LF};
use bytes::{Bytes, BytesMut};

const CR: u8 = b'\r';

#[inline]
fn is_space(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

/// Removes one complete line from the front of `buf`.
///
/// Returns the line without its `\n` (and without a single preceding `\r`),
/// or `None` if `buf` does not yet hold a terminator. Bytes after the
/// terminator stay in the buffer.
pub fn split_line(buf: &mut BytesMut) -> Option<Bytes> {
    let pos = find_lf(buf)?;

    let mut line = buf.split_to(pos + 1).freeze();
    line.truncate(pos);
    if line.last() == Some(&CR) {
        line.truncate(pos - 1);
    }

    Some(line)
}

#[inline]
fn find_lf(buf: &[u8]) -> Option<usize> {
    buf.iter().position(|&b| b == LF)
}

/// Parses one line (already stripped of its terminator) into a command.
///
/// # Example
///
/// ```
/// use linekv::protocol::{parse_command, Command};
/// use bytes::Bytes;
///
/// let command = parse_command(Bytes::from("SET greeting hello world"));
/// assert_eq!(
///     command,
///     Command::Set {
///         key: Bytes::from("greeting"),
///         value: Bytes::from("hello world"),
///     }
/// );
///
/// let command = parse_command(Bytes::from("FOO BAR"));
/// assert_eq!(command, Command::Malformed(Bytes::from("FOO BAR")));
/// ```
pub fn parse_command(line: Bytes) -> Command {
    match parse_parts(&line) {
        Some(command) => command,
        None => Command::Malformed(line),
    }
}

fn parse_parts(line: &Bytes) -> Option<Command> {
    let mut tokens = Tokens::new(line);

    let verb = tokens.next_token()?;
    let key = tokens.next_token()?;

    match &verb[..] {
        b"GET" => tokens.is_exhausted().then_some(Command::Get { key }),
        b"DEL" => tokens.is_exhausted().then_some(Command::Del { key }),
        b"SET" => {
            let value = tokens.remainder()?;
            Some(Command::Set { key, value })
        }
        _ => None,
    }
}

/// Whitespace tokenizer over a line that hands out zero-copy slices.
struct Tokens<'a> {
    line: &'a Bytes,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(line: &'a Bytes) -> Self {
        Self { line, pos: 0 }
    }

    fn skip_spaces(&mut self) {
        while self.pos < self.line.len() && is_space(self.line[self.pos]) {
            self.pos += 1;
        }
    }

    /// Returns the next whitespace-delimited token, or `None` at end of line.
    fn next_token(&mut self) -> Option<Bytes> {
        self.skip_spaces();
        let start = self.pos;
        while self.pos < self.line.len() && !is_space(self.line[self.pos]) {
            self.pos += 1;
        }
        (self.pos > start).then(|| self.line.slice(start..self.pos))
    }

    /// Returns everything after the separator following the last token,
    /// verbatim, or `None` if nothing is left.
    fn remainder(&mut self) -> Option<Bytes> {
        self.skip_spaces();
        (self.pos < self.line.len()).then(|| self.line.slice(self.pos..))
    }

    fn is_exhausted(&mut self) -> bool {
        self.skip_spaces();
        self.pos == self.line.len()
    }
}
