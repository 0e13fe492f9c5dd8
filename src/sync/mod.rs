//! Index synchronization: walking trees, routing files through language
//! detection and keeping one document per canonical path.

mod engine;
mod error;
mod walker;

pub use engine::{SyncEngine, TreeStats};
pub use error::{SyncError, SyncResult};
pub use walker::TreeWalker;
