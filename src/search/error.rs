use thiserror::Error;

use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid value '{value}' for {setting}")]
    InvalidSetting {
        setting: &'static str,
        value: String,
    },

    #[error("Query produced no searchable term")]
    NoTerm,

    #[error("Index error: {0}")]
    Storage(#[from] StorageError),

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

impl From<tantivy::TantivyError> for SearchError {
    fn from(e: tantivy::TantivyError) -> Self {
        SearchError::Storage(StorageError::Tantivy(e))
    }
}

pub type SearchResult<T> = Result<T, SearchError>;
