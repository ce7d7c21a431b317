//! Storage Module
//!
//! This module holds the shared key-value [`Table`]: a thread-safe,
//! sharded map from byte-string keys to byte-string values.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Table                              │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │...64    │           │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │ shards  │           │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//!        ▲              ▲              ▲
//!        │              │              │
//!   connection 1   connection 2   connection N
//! ```
//!
//! ## Example
//!
//! ```
//! use linekv::storage::Table;
//! use bytes::Bytes;
//! use std::sync::Arc;
//!
//! let table = Arc::new(Table::new());
//!
//! table.set(Bytes::from("name"), Bytes::from("alice"));
//! assert_eq!(table.get(b"name"), Some(Bytes::from("alice")));
//! ```

pub mod engine;

pub use engine::{Table, TableStats};
