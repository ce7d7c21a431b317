//! # linekv - A Concurrent In-Memory Key-Value Store
//!
//! linekv serves one shared in-memory table to many simultaneous TCP
//! clients. Clients speak a line-oriented text protocol: one `GET`, `SET`
//! or `DEL` per line, one response line per request.
//!
//! ## Features
//!
//! - **Line Protocol**: Human-typeable requests, usable from `nc` or `telnet`
//! - **Concurrent Table**: Sharded storage with RwLock, atomic per operation
//! - **Async I/O**: Built on Tokio, one task per connection
//! - **Graceful Shutdown**: In-flight requests finish within a grace period
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              linekv                                     │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │ TCP Server  │───>│ Connection  │───>│  Command    │                  │
//! │  │ (Listener)  │    │  Handler    │    │  Executor   │                  │
//! │  └─────────────┘    └──────┬──────┘    └──────┬──────┘                  │
//! │                            │                  │                         │
//! │                            ▼                  ▼                         │
//! │  ┌─────────────┐    ┌──────────────────────────────────────────────┐   │
//! │  │   Line      │    │                  Table                       │   │
//! │  │   Parser    │    │  ┌────────┐ ┌────────┐ ┌────────┐ ┌────────┐ │   │
//! │  │             │    │  │Shard 0 │ │Shard 1 │ │Shard 2 │ │...N    │ │   │
//! │  └─────────────┘    │  │RwLock  │ │RwLock  │ │RwLock  │ │shards  │ │   │
//! │                     │  └────────┘ └────────┘ └────────┘ └────────┘ │   │
//! │                     └──────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use linekv::config::Config;
//! use linekv::server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let server = Server::bind(&Config::default()).await?;
//!     server.run(async { tokio::signal::ctrl_c().await.ok(); }).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Protocol
//!
//! ```text
//! GET <key>            ->  VALUE: <value>  |  NOT_FOUND
//! SET <key> <value>    ->  OK
//! DEL <key>            ->  DELETED  |  NOT_FOUND
//! anything else        ->  ERROR: <message>
//! ```
//!
//! Keys cannot contain whitespace; a value is everything after the key.
//!
//! ## Module Overview
//!
//! - [`protocol`]: Line framing, command parser and response types
//! - [`storage`]: The shared, thread-safe table
//! - [`commands`]: Applies commands to the table
//! - [`connection`]: Per-client connection handling
//! - [`server`]: Listener, dispatcher and graceful shutdown
//! - [`config`]: Command-line and environment configuration
//!
//! ## Design Highlights
//!
//! ### Thread Safety
//!
//! The table is created once and shared as an `Arc<Table>`. Each operation
//! takes one shard lock for the duration of that single operation and
//! never across a network read or write. Concurrent operations therefore
//! linearize in some order and no reader ever sees a partial value.
//!
//! ### Zero-Copy Parsing
//!
//! Lines are split off the connection buffer as `bytes::Bytes`, and keys
//! and values are slices of that line, so parsing does not copy.

pub mod commands;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod server;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::CommandExecutor;
pub use config::{Config, ConnectionConfig};
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{Command, CommandResult};
pub use server::Server;
pub use storage::{Table, TableStats};

/// The default port linekv listens on
pub const DEFAULT_PORT: u16 = 7878;

/// The default host linekv binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of linekv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
