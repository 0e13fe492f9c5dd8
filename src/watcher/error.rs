//! Error types for the directory watcher.

use std::path::PathBuf;
use thiserror::Error;

use super::backend::WatchHandle;
use crate::sync::SyncError;

/// Errors from watcher operations.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to initialize watcher: {reason}")]
    InitFailed { reason: String },

    #[error("Cannot watch path {path}: {reason}")]
    PathWatchFailed { path: PathBuf, reason: String },

    #[error("No directory bound to watch handle {handle}")]
    UnboundHandle { handle: WatchHandle },

    #[error("Index error: {0}")]
    Sync(#[from] SyncError),

    #[error("Channel closed unexpectedly")]
    ChannelClosed,
}

impl From<notify::Error> for WatchError {
    fn from(e: notify::Error) -> Self {
        WatchError::InitFailed {
            reason: e.to_string(),
        }
    }
}
