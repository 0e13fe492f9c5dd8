//! Language-aware full-text index that follows a live directory tree.
//!
//! Files under registered roots are identified as English or Polish and
//! indexed into language-specific fields of a tantivy index. The watch loop
//! keeps the index in step with the filesystem, and the search side turns
//! interactive queries into term, phrase or fuzzy queries over one language.

pub mod cli;
pub mod config;
pub mod extract;
pub mod language;
pub mod logging;
pub mod search;
pub mod storage;
pub mod sync;
pub mod watcher;

pub use config::Settings;
pub use extract::{ExtractionError, PlainTextExtractor, TextExtractor};
pub use language::{Language, LanguageGuess, LanguageIdentifier, WhatlangIdentifier};
pub use search::{QueryMode, QueryTranslator, SearchError, SearchSession};
pub use storage::{IndexStore, StorageError};
pub use sync::{SyncEngine, SyncError, TreeStats};
pub use watcher::{Monitor, WatchError};
