//! The watch loop: turns filesystem changes into index mutations.

use std::ffi::OsString;
use std::path::Path;

use tokio::sync::mpsc;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use super::backend::{ChangeKind, DirectoryWatcher, FsEvent, NotifyWatcher, WatchHandle};
use super::debouncer::Debouncer;
use super::error::WatchError;
use super::registry::WatchRegistry;
use crate::config::Settings;
use crate::sync::{SyncEngine, SyncError, TreeWalker};
use crate::{debug_event, log_event};

/// How often pending debounced changes are checked.
const TICK: Duration = Duration::from_millis(100);

/// A change already resolved against a watch handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsChange {
    pub kind: ChangeKind,
    pub handle: WatchHandle,
    /// Entry name relative to the watched directory.
    pub name: OsString,
}

/// Single sequential consumer of change events.
///
/// Failures while handling one event are logged and never stop the loop.
/// Only the cancellation token or a closed event channel ends [`run`](Self::run).
pub struct Monitor<W> {
    engine: SyncEngine,
    registry: WatchRegistry<W>,
    debouncer: Debouncer,
    events: mpsc::Receiver<FsEvent>,
    cancel: CancellationToken,
}

impl Monitor<NotifyWatcher> {
    pub fn builder() -> MonitorBuilder {
        MonitorBuilder::new()
    }

    /// Monitor backed by `notify`, configured from settings.
    pub fn from_settings(
        engine: SyncEngine,
        settings: &Settings,
        cancel: CancellationToken,
    ) -> Result<Self, WatchError> {
        let (backend, events) = NotifyWatcher::new(settings.watch.channel_capacity)?;
        Ok(MonitorBuilder::new()
            .debounce_ms(settings.watch.debounce_ms)
            .ignore_patterns(&settings.indexing.ignore_patterns)
            .cancel_token(cancel)
            .build(engine, backend, events))
    }
}

impl<W: DirectoryWatcher> Monitor<W> {
    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    pub fn registry(&self) -> &WatchRegistry<W> {
        &self.registry
    }

    /// Watch every stored root, then process events until cancelled.
    pub async fn run(mut self) -> Result<(), WatchError> {
        let dirs = self.register_roots()?;
        log_event!("watcher", "started", "{dirs} directories");

        // One ticker for the whole loop so a busy channel cannot starve it
        let mut ticker = interval(TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    log_event!("watcher", "stopped");
                    return Ok(());
                }

                received = self.events.recv() => {
                    let Some(first) = received else {
                        return Err(WatchError::ChannelClosed);
                    };
                    // Drain everything already queued into one batch
                    let mut batch = vec![first];
                    while let Ok(event) = self.events.try_recv() {
                        batch.push(event);
                    }
                    debug_event!("watcher", "batch", "{} events", batch.len());
                    for event in batch {
                        self.handle_event(event);
                    }
                }

                _ = ticker.tick() => {
                    self.process_ready();
                }
            }
        }
    }

    /// Register a watch on every directory under every stored root.
    pub fn register_roots(&mut self) -> Result<usize, WatchError> {
        let mut dirs = 0;
        for root in self.engine.list_roots()? {
            if !root.is_dir() {
                tracing::warn!("[watcher] root no longer exists: {}", root.display());
                continue;
            }
            dirs += self.registry.register_tree(&root);
        }
        Ok(dirs)
    }

    /// Handle one backend event.
    pub fn handle_event(&mut self, event: FsEvent) {
        match self.registry.locate(&event.path) {
            Some((handle, name)) => self.handle_change(FsChange {
                kind: event.kind,
                handle,
                name,
            }),
            None => debug_event!("watcher", "unwatched", "{}", event.path.display()),
        }
    }

    /// Handle one change reported against a watch handle.
    pub fn handle_change(&mut self, change: FsChange) {
        let path = match self.registry.resolve_event(change.handle, &change.name) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("[watcher] {e}");
                return;
            }
        };

        match change.kind {
            ChangeKind::Created => self.on_created(&path),
            ChangeKind::Modified => self.debouncer.record(path),
            ChangeKind::Deleted => self.on_deleted(&path),
        }
    }

    /// Re-index every modified path whose debounce period has elapsed.
    pub fn process_ready(&mut self) {
        for path in self.debouncer.take_ready() {
            if !path.exists() {
                // Renamed away or deleted before we got to it
                self.on_deleted(&path);
            } else if path.is_file() {
                log_event!("watcher", "modified", "{}", path.display());
                self.reindex(&path);
            }
        }
    }

    pub fn has_pending(&self) -> bool {
        self.debouncer.has_pending()
    }

    fn on_created(&mut self, path: &Path) {
        log_event!("watcher", "created", "{}", path.display());
        if path.is_dir() {
            self.registry.register_tree(path);
        }
        self.reindex(path);
    }

    fn on_deleted(&mut self, path: &Path) {
        log_event!("watcher", "deleted", "{}", path.display());
        self.debouncer.remove_tree(path);
        self.registry.forget_tree(path);
        if let Err(e) = self.engine.remove_by_prefix(path) {
            tracing::error!("[watcher] failed to remove {}: {e}", path.display());
        }
    }

    fn reindex(&self, path: &Path) {
        match self.engine.add_tree(path, false) {
            Ok(stats) => debug_event!(
                "watcher",
                "indexed",
                "{} ({} indexed, {} skipped)",
                path.display(),
                stats.indexed,
                stats.skipped
            ),
            Err(SyncError::PathNotFound { .. }) => {
                debug_event!("watcher", "vanished", "{}", path.display());
            }
            Err(e) => tracing::error!("[watcher] failed to index {}: {e}", path.display()),
        }
    }
}

/// Builder for constructing a [`Monitor`].
pub struct MonitorBuilder {
    debounce_ms: u64,
    ignore_patterns: Vec<String>,
    cancel: Option<CancellationToken>,
}

impl MonitorBuilder {
    pub fn new() -> Self {
        Self {
            debounce_ms: 300,
            ignore_patterns: Vec::new(),
            cancel: None,
        }
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Patterns excluded when registering directory watches.
    pub fn ignore_patterns(mut self, patterns: &[String]) -> Self {
        self.ignore_patterns = patterns.to_vec();
        self
    }

    pub fn cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn build<W: DirectoryWatcher>(
        self,
        engine: SyncEngine,
        backend: W,
        events: mpsc::Receiver<FsEvent>,
    ) -> Monitor<W> {
        Monitor {
            engine,
            registry: WatchRegistry::new(backend, TreeWalker::new(&self.ignore_patterns)),
            debouncer: Debouncer::new(self.debounce_ms),
            events,
            cancel: self.cancel.unwrap_or_default(),
        }
    }
}

impl Default for MonitorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
