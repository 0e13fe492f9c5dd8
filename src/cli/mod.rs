//! Command-line interface for the indexer and search binaries.

pub mod args;
pub mod commands;

pub use args::{IndexerAction, IndexerCli, SearchCli};
