//! Live filesystem monitoring.
//!
//! # Architecture
//!
//! ```text
//! NotifyWatcher (one non-recursive watch per directory)
//!      |  FsEvent over a bounded channel
//!      v
//! Monitor
//!   - WatchRegistry (handle <-> directory)
//!   - Debouncer (modifications only)
//!      |
//!      v
//! SyncEngine
//! ```

mod backend;
mod debouncer;
mod error;
mod monitor;
mod registry;

pub use backend::{ChangeKind, DirectoryWatcher, FsEvent, NotifyWatcher, WatchHandle, translate};
pub use debouncer::Debouncer;
pub use error::WatchError;
pub use monitor::{FsChange, Monitor, MonitorBuilder};
pub use registry::WatchRegistry;
