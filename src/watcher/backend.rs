//! Per-directory watch backends.

use std::fmt;
use std::path::{Path, PathBuf};

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::error::WatchError;

/// Opaque identifier the backend hands out for one directory watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchHandle(u64);

impl WatchHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
}

/// A change reported by the backend for a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEvent {
    pub kind: ChangeKind,
    pub path: PathBuf,
}

/// Registers non-recursive watches on single directories.
pub trait DirectoryWatcher: Send {
    /// Start watching `dir`. Every call returns a fresh handle, even for a
    /// directory that is already watched.
    fn watch(&mut self, dir: &Path) -> Result<WatchHandle, WatchError>;

    fn unwatch(&mut self, dir: &Path) -> Result<(), WatchError>;
}

/// `notify`-backed watcher feeding a bounded channel of [`FsEvent`]s.
pub struct NotifyWatcher {
    watcher: RecommendedWatcher,
    next_handle: u64,
}

impl NotifyWatcher {
    /// Create the watcher and the receiving end of its event channel.
    pub fn new(channel_capacity: usize) -> Result<(Self, mpsc::Receiver<FsEvent>), WatchError> {
        let (tx, rx) = mpsc::channel(channel_capacity.max(1));

        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for change in translate(event) {
                    if tx.blocking_send(change).is_err() {
                        return;
                    }
                }
            }
            Err(e) => tracing::warn!("[watcher] backend error: {e}"),
        })?;

        Ok((
            Self {
                watcher,
                next_handle: 0,
            },
            rx,
        ))
    }
}

impl DirectoryWatcher for NotifyWatcher {
    fn watch(&mut self, dir: &Path) -> Result<WatchHandle, WatchError> {
        self.watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::PathWatchFailed {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            })?;
        self.next_handle += 1;
        Ok(WatchHandle(self.next_handle))
    }

    fn unwatch(&mut self, dir: &Path) -> Result<(), WatchError> {
        self.watcher
            .unwatch(dir)
            .map_err(|e| WatchError::PathWatchFailed {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

/// Map a notify event onto create/modify/delete changes.
///
/// Renames become a delete of the old path and a create of the new one.
pub fn translate(event: Event) -> Vec<FsEvent> {
    let Event { kind, paths, .. } = event;
    match kind {
        EventKind::Create(_) => all(paths, ChangeKind::Created),
        EventKind::Remove(_) => all(paths, ChangeKind::Deleted),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => all(paths, ChangeKind::Deleted),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => all(paths, ChangeKind::Created),
        // Paired renames are also reported as separate From/To events
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => Vec::new(),
        EventKind::Modify(ModifyKind::Name(_)) => paths
            .into_iter()
            .map(|path| {
                let kind = if path.exists() {
                    ChangeKind::Created
                } else {
                    ChangeKind::Deleted
                };
                FsEvent { kind, path }
            })
            .collect(),
        EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
        EventKind::Modify(_) => all(paths, ChangeKind::Modified),
        _ => Vec::new(),
    }
}

fn all(paths: Vec<PathBuf>, kind: ChangeKind) -> Vec<FsEvent> {
    paths
        .into_iter()
        .map(|path| FsEvent { kind, path })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, MetadataKind, RemoveKind};

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        paths
            .iter()
            .fold(Event::new(kind), |event, path| event.add_path(PathBuf::from(path)))
    }

    #[test]
    fn test_translate_basic_kinds() {
        let created = translate(event(EventKind::Create(CreateKind::File), &["/d/a.txt"]));
        assert_eq!(
            created,
            vec![FsEvent {
                kind: ChangeKind::Created,
                path: PathBuf::from("/d/a.txt")
            }]
        );

        let modified = translate(event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &["/d/a.txt"],
        ));
        assert_eq!(modified[0].kind, ChangeKind::Modified);

        let removed = translate(event(EventKind::Remove(RemoveKind::File), &["/d/a.txt"]));
        assert_eq!(removed[0].kind, ChangeKind::Deleted);
    }

    #[test]
    fn test_translate_rename_halves() {
        let from = translate(event(
            EventKind::Modify(ModifyKind::Name(RenameMode::From)),
            &["/d/old.txt"],
        ));
        let to = translate(event(
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            &["/d/new.txt"],
        ));

        assert_eq!(from[0].kind, ChangeKind::Deleted);
        assert_eq!(to[0].kind, ChangeKind::Created);
    }

    #[test]
    fn test_translate_ignores_noise() {
        assert!(
            translate(event(
                EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
                &["/d/old.txt", "/d/new.txt"],
            ))
            .is_empty()
        );
        assert!(
            translate(event(
                EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
                &["/d/a.txt"],
            ))
            .is_empty()
        );
        assert!(translate(event(EventKind::Any, &["/d/a.txt"])).is_empty());
    }

    #[test]
    fn test_notify_watcher_issues_fresh_handles() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let (mut watcher, _rx) = NotifyWatcher::new(8).unwrap();

        let first = watcher.watch(temp_dir.path()).unwrap();
        let second = watcher.watch(temp_dir.path()).unwrap();
        assert_ne!(first, second);

        assert!(watcher.watch(&temp_dir.path().join("missing")).is_err());
    }
}
