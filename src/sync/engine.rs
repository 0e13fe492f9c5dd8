//! Keeps index contents consistent with the filesystem.
//!
//! Every public mutation opens exactly one write session and commits it
//! before returning. The engine holds no lock of its own; callers are
//! sequential loops (the CLI and the watch loop) and tantivy's writer lock
//! rejects a second writer on the same directory.

use std::path::{Path, PathBuf};

use super::error::{SyncError, SyncResult};
use super::walker::TreeWalker;
use crate::config::Settings;
use crate::extract::{PlainTextExtractor, TextExtractor};
use crate::language::{Language, LanguageIdentifier, WhatlangIdentifier};
use crate::storage::{FileRecord, IndexStore, WriteSession};
use crate::{debug_event, log_event};

/// Outcome of indexing a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub indexed: usize,
    pub skipped: usize,
}

impl TreeStats {
    fn merge(&mut self, other: TreeStats) {
        self.indexed += other.indexed;
        self.skipped += other.skipped;
    }
}

pub struct SyncEngine {
    store: IndexStore,
    walker: TreeWalker,
    extractor: Box<dyn TextExtractor>,
    identifier: Box<dyn LanguageIdentifier>,
}

impl SyncEngine {
    /// Engine over `store` with the plain-text extractor and whatlang identification.
    pub fn new(store: IndexStore, settings: &Settings) -> Self {
        Self {
            store,
            walker: TreeWalker::new(&settings.indexing.ignore_patterns),
            extractor: Box::new(PlainTextExtractor),
            identifier: Box::new(WhatlangIdentifier::new(settings.indexing.min_confidence)),
        }
    }

    /// Open the configured index and build an engine over it.
    pub fn open(settings: &Settings) -> SyncResult<Self> {
        let store = IndexStore::open(&settings.index_path, settings.indexing.writer_heap_bytes)?;
        Ok(Self::new(store, settings))
    }

    pub fn with_extractor(mut self, extractor: impl TextExtractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    pub fn with_identifier(mut self, identifier: impl LanguageIdentifier + 'static) -> Self {
        self.identifier = Box::new(identifier);
        self
    }

    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    /// Index every regular file under `path`, optionally recording it as a root.
    ///
    /// Per-file failures are logged and counted, never returned.
    pub fn add_tree(&self, path: &Path, register_as_root: bool) -> SyncResult<TreeStats> {
        let root = canonical(path)?;
        if register_as_root && !root.is_dir() {
            return Err(SyncError::NotADirectory { path: root });
        }

        let mut session = self.store.write_session()?;
        if register_as_root {
            session.put_root(&key(&root)?)?;
            log_event!("sync", "root added", "{}", root.display());
        }

        let mut stats = TreeStats::default();
        for file in self.walker.files(&root) {
            match self.index_file(&mut session, &file) {
                Ok(language) => {
                    debug_event!("sync", "indexed", "{} [{language}]", file.display());
                    stats.indexed += 1;
                }
                Err(e) if e.is_per_file() => {
                    log_skip(&e);
                    stats.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
        session.commit()?;

        log_event!(
            "sync",
            "tree indexed",
            "{} ({} indexed, {} skipped)",
            root.display(),
            stats.indexed,
            stats.skipped
        );
        Ok(stats)
    }

    /// Index a single file, replacing any previous document for it.
    pub fn add_file(&self, path: &Path) -> SyncResult<Language> {
        let file = canonical(path)?;
        let mut session = self.store.write_session()?;
        let language = self.index_file(&mut session, &file)?;
        session.commit()?;
        Ok(language)
    }

    /// Forget a registered root and the documents of the files currently under it.
    pub fn remove_tree(&self, path: &Path) -> SyncResult<()> {
        let root = canonical(path)?;
        let root_key = key(&root)?;
        if !self.store.stored_roots()?.contains(&root_key) {
            return Err(SyncError::NotRegistered { path: root });
        }

        let session = self.store.write_session()?;
        session.delete_root(&root_key);
        let mut removed = 0usize;
        // Non-UTF-8 paths never got a document
        for file_key in self.walker.files(&root).filter_map(|file| key(&file).ok()) {
            session.delete_file(&file_key);
            removed += 1;
        }
        session.commit()?;

        log_event!(
            "sync",
            "root removed",
            "{} ({removed} files)",
            root.display()
        );
        Ok(())
    }

    /// Delete the document at `raw_path` and every document beneath it.
    ///
    /// `raw_path` is used as given, without canonicalization, since it
    /// usually names something that no longer exists.
    pub fn remove_by_prefix(&self, raw_path: &Path) -> SyncResult<()> {
        let prefix = key(raw_path)?;
        if prefix.is_empty() {
            return Ok(());
        }

        let mut session = self.store.write_session()?;
        session.delete_prefix(&prefix)?;
        session.commit()?;

        debug_event!("sync", "removed prefix", "{prefix}");
        Ok(())
    }

    /// Stored watched roots, sorted.
    pub fn list_roots(&self) -> SyncResult<Vec<PathBuf>> {
        Ok(self
            .store
            .stored_roots()?
            .into_iter()
            .map(PathBuf::from)
            .collect())
    }

    /// Delete every document and root marker.
    pub fn purge_all(&self) -> SyncResult<()> {
        let mut session = self.store.write_session()?;
        session.delete_all()?;
        session.commit()?;

        log_event!("sync", "purged", "{}", self.store.path().display());
        Ok(())
    }

    /// Rebuild the index from the stored roots.
    ///
    /// Roots that no longer exist on disk are dropped.
    pub fn reindex(&self) -> SyncResult<TreeStats> {
        let roots = self.store.stored_roots()?;
        self.purge_all()?;

        let mut stats = TreeStats::default();
        for root in roots {
            match self.add_tree(Path::new(&root), true) {
                Ok(tree) => stats.merge(tree),
                Err(e) if e.is_per_file() => {
                    tracing::warn!("[sync] dropping root {root}: {e}");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(stats)
    }

    /// Number of indexed files.
    pub fn file_count(&self) -> SyncResult<usize> {
        Ok(self.store.file_count()?)
    }

    fn index_file(&self, session: &mut WriteSession<'_>, file: &Path) -> SyncResult<Language> {
        let path = key(file)?;
        let body = self
            .extractor
            .extract(file)
            .map_err(|source| SyncError::Extraction {
                path: file.to_path_buf(),
                source,
            })?;

        let guess = self
            .identifier
            .identify(&body)
            .filter(|guess| guess.reliable)
            .ok_or_else(|| SyncError::UnknownLanguage {
                path: file.to_path_buf(),
            })?;

        let language = guess
            .supported()
            .ok_or_else(|| SyncError::UnsupportedLanguage {
                path: file.to_path_buf(),
                language: guess.code.clone(),
            })?;

        let name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        session.put_file(&FileRecord {
            path: &path,
            name: &name,
            body: &body,
            language,
        })?;
        Ok(language)
    }
}

fn canonical(path: &Path) -> SyncResult<PathBuf> {
    path.canonicalize().map_err(|_| SyncError::PathNotFound {
        path: path.to_path_buf(),
    })
}

/// Document key for `path`. Keys must round-trip, so non-UTF-8 paths are refused.
fn key(path: &Path) -> SyncResult<String> {
    path.to_str()
        .map(str::to_owned)
        .ok_or_else(|| SyncError::NonUtf8Path {
            path: path.to_path_buf(),
        })
}

fn log_skip(error: &SyncError) {
    match error {
        SyncError::UnknownLanguage { .. } | SyncError::UnsupportedLanguage { .. } => {
            tracing::info!("[sync] skipped: {error}");
        }
        _ => tracing::warn!("[sync] skipped: {error}"),
    }
}
