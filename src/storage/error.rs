use std::path::PathBuf;

use tantivy::TantivyError;
use tantivy::directory::error::OpenDirectoryError;
use thiserror::Error;

/// Failures to open, read or write the on-disk index.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Tantivy error: {0}")]
    Tantivy(#[from] TantivyError),

    #[error("Directory error: {0}")]
    Directory(#[from] OpenDirectoryError),

    #[error("Cannot create index directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Index at {path} has an incompatible schema: {reason}")]
    SchemaMismatch { path: PathBuf, reason: String },
}

pub type StorageResult<T> = Result<T, StorageError>;
