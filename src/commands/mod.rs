//! Command Execution Module
//!
//! This module applies parsed commands to the shared table and returns
//! their typed outcome.
//!
//! ## Architecture
//!
//! ```text
//! Client line
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  Line Parser    │  (protocol module)
//! └────────┬────────┘
//!          │ Command
//!          ▼
//! ┌─────────────────┐
//! │ CommandExecutor │  (this module)
//! └────────┬────────┘
//!          │ one get/set/delete
//!          ▼
//! ┌─────────────────┐
//! │     Table       │  (storage module)
//! └─────────────────┘
//! ```

pub mod executor;

pub use executor::{execute, CommandExecutor};
