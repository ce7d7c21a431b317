//! Command Executor
//!
//! Applies a parsed [`Command`] to the shared [`Table`] and produces a
//! [`CommandResult`]. Each command performs at most one table operation, so
//! its atomicity is exactly the table's per-operation atomicity.
//!
//! | Command        | Table call       | Result                      |
//! |----------------|------------------|-----------------------------|
//! | `GET key`      | `get(key)`       | `Found(value)` / `NotFound` |
//! | `SET key val`  | `set(key, val)`  | `Stored`                    |
//! | `DEL key`      | `delete(key)`    | `Deleted` / `NotFound`      |
//! | malformed line | none             | `ParseError(message)`       |

use crate::protocol::{Command, CommandResult, MALFORMED_MESSAGE};
use crate::storage::Table;
use std::sync::Arc;
use tracing::debug;

/// Executes one command against `table`.
pub fn execute(command: Command, table: &Table) -> CommandResult {
    match command {
        Command::Get { key } => match table.get(&key) {
            Some(value) => CommandResult::Found(value),
            None => CommandResult::NotFound,
        },
        Command::Set { key, value } => {
            table.set(key, value);
            CommandResult::Stored
        }
        Command::Del { key } => {
            if table.delete(&key) {
                CommandResult::Deleted
            } else {
                CommandResult::NotFound
            }
        }
        Command::Malformed(line) => {
            debug!(line = %String::from_utf8_lossy(&line), "Malformed command");
            CommandResult::ParseError(MALFORMED_MESSAGE.to_string())
        }
    }
}

/// A cloneable handle that executes commands against a shared table.
///
/// Every connection gets its own clone; all clones point at the same table.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    table: Arc<Table>,
}

impl CommandExecutor {
    /// Creates an executor over the given shared table.
    pub fn new(table: Arc<Table>) -> Self {
        Self { table }
    }

    /// Executes a command and returns its result.
    pub fn execute(&self, command: Command) -> CommandResult {
        execute(command, &self.table)
    }

    /// The table this executor writes to.
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }
}
