//! Tantivy-backed index: schema, analyzers and write sessions.

pub mod analyzers;
pub mod error;
pub mod index;
pub mod schema;

pub use error::{StorageError, StorageResult};
pub use index::{FileRecord, IndexStore, WriteSession};
pub use schema::DocumentSchema;
