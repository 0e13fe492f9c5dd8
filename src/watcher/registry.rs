//! Bidirectional table between watch handles and the directories they cover.

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use super::backend::{DirectoryWatcher, WatchHandle};
use super::error::WatchError;
use crate::sync::TreeWalker;

/// Live watch coverage. Every directory has at most one handle and every
/// handle at most one directory.
pub struct WatchRegistry<W> {
    backend: W,
    walker: TreeWalker,
    by_handle: HashMap<WatchHandle, PathBuf>,
    by_dir: HashMap<PathBuf, WatchHandle>,
}

impl<W: DirectoryWatcher> WatchRegistry<W> {
    pub fn new(backend: W, walker: TreeWalker) -> Self {
        Self {
            backend,
            walker,
            by_handle: HashMap::new(),
            by_dir: HashMap::new(),
        }
    }

    /// Watch every directory under `path`. Returns how many were bound.
    ///
    /// Directories that cannot be watched are logged and skipped.
    pub fn register_tree(&mut self, path: &Path) -> usize {
        let mut bound = 0;
        for dir in self.walker.dirs(path) {
            match self.backend.watch(&dir) {
                Ok(handle) => {
                    crate::debug_event!("registry", "bound", "{handle} -> {}", dir.display());
                    self.bind(dir, handle);
                    bound += 1;
                }
                Err(e) => tracing::warn!("[registry] {e}"),
            }
        }
        bound
    }

    fn bind(&mut self, dir: PathBuf, handle: WatchHandle) {
        if let Some(stale) = self.by_dir.insert(dir.clone(), handle) {
            if stale != handle {
                self.by_handle.remove(&stale);
            }
        }
        if let Some(previous) = self.by_handle.insert(handle, dir.clone()) {
            if previous != dir {
                self.by_dir.remove(&previous);
            }
        }
    }

    /// Absolute path of `name` inside the directory bound to `handle`.
    pub fn resolve_event(&self, handle: WatchHandle, name: &OsStr) -> Result<PathBuf, WatchError> {
        self.by_handle
            .get(&handle)
            .map(|dir| dir.join(name))
            .ok_or(WatchError::UnboundHandle { handle })
    }

    /// Handle and relative name under which a backend would report `path`.
    pub fn locate(&self, path: &Path) -> Option<(WatchHandle, OsString)> {
        let parent = path.parent()?;
        let name = path.file_name()?;
        let handle = self.by_dir.get(parent)?;
        Some((*handle, name.to_os_string()))
    }

    /// Drop bindings for `path` and every directory beneath it.
    pub fn forget_tree(&mut self, path: &Path) -> usize {
        let gone: Vec<PathBuf> = self
            .by_dir
            .keys()
            .filter(|dir| dir.starts_with(path))
            .cloned()
            .collect();

        for dir in &gone {
            if let Some(handle) = self.by_dir.remove(dir) {
                self.by_handle.remove(&handle);
            }
            // The backend usually drops watches on deleted directories itself
            if let Err(e) = self.backend.unwatch(dir) {
                crate::debug_event!("registry", "unwatch failed", "{e}");
            }
        }
        gone.len()
    }

    pub fn handle_for(&self, dir: &Path) -> Option<WatchHandle> {
        self.by_dir.get(dir).copied()
    }

    pub fn dir_count(&self) -> usize {
        self.by_dir.len()
    }

    pub fn backend(&self) -> &W {
        &self.backend
    }
}
