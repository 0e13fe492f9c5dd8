//! Error types for index synchronization.

use std::path::PathBuf;
use thiserror::Error;

use crate::extract::ExtractionError;
use crate::storage::StorageError;

/// Errors from synchronization operations.
///
/// Every variant except `Storage` is a per-path failure that tree walks log
/// and skip. `Storage` means the index itself is unusable and always
/// propagates.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Path not found: {path}")]
    PathNotFound { path: PathBuf },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Cannot extract text from {path}: {source}")]
    Extraction {
        path: PathBuf,
        #[source]
        source: ExtractionError,
    },

    #[error("Language of {path} could not be identified reliably")]
    UnknownLanguage { path: PathBuf },

    #[error("Unsupported language '{language}' in {path}")]
    UnsupportedLanguage { path: PathBuf, language: String },

    #[error("Path is not valid UTF-8: {path}")]
    NonUtf8Path { path: PathBuf },

    #[error("Not a watched root: {path}")]
    NotRegistered { path: PathBuf },

    #[error("Index error: {0}")]
    Storage(#[from] StorageError),
}

impl SyncError {
    /// Whether this error concerns a single file rather than the index.
    pub fn is_per_file(&self) -> bool {
        !matches!(self, SyncError::Storage(_))
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
