//! Command implementations for the CLI.
//!
//! Each indexer action lives in its own module; `main.rs` only dispatches.

pub mod init;
pub mod roots;
pub mod search;
pub mod watch;
