//! Server Module
//!
//! The listener/dispatcher that ties everything together. The shared
//! [`Table`](crate::storage::Table) is created here (or handed in) as an
//! `Arc`, and every accepted connection gets its own clone of that handle.
//!
//! ## Example
//!
//! ```ignore
//! use linekv::config::Config;
//! use linekv::server::Server;
//!
//! let server = Server::bind(&Config::default()).await?;
//! server.run(async { tokio::signal::ctrl_c().await.ok(); }).await;
//! ```

pub mod listener;

pub use listener::Server;
