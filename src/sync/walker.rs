//! Lazy directory traversal for indexing and watch registration.

use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;
use std::path::{Path, PathBuf};

/// Walks directory trees, yielding regular files or directories.
///
/// Unlike a source-code walker this does not honor `.gitignore` or skip
/// hidden entries: every file under a watched root is a candidate. Only the
/// configured `ignore_patterns` are excluded.
#[derive(Debug, Clone, Default)]
pub struct TreeWalker {
    ignore_patterns: Vec<String>,
}

impl TreeWalker {
    pub fn new(ignore_patterns: &[String]) -> Self {
        Self {
            ignore_patterns: ignore_patterns.to_vec(),
        }
    }

    /// Regular files under `root`. A file `root` yields itself.
    pub fn files(&self, root: &Path) -> impl Iterator<Item = PathBuf> + use<> {
        self.entries(root, |file_type| file_type.is_file())
    }

    /// Directories under `root`, `root` included.
    pub fn dirs(&self, root: &Path) -> impl Iterator<Item = PathBuf> + use<> {
        self.entries(root, |file_type| file_type.is_dir())
    }

    fn entries(
        &self,
        root: &Path,
        keep: fn(&std::fs::FileType) -> bool,
    ) -> impl Iterator<Item = PathBuf> + use<> {
        let mut builder = WalkBuilder::new(root);
        builder
            .standard_filters(false)
            .follow_links(false)
            .max_depth(None);

        // Ignore patterns become negated overrides
        let mut override_builder = OverrideBuilder::new(root);
        for pattern in &self.ignore_patterns {
            if let Err(e) = override_builder.add(&format!("!{pattern}")) {
                tracing::warn!("[walker] invalid ignore pattern '{pattern}': {e}");
            }
        }
        match override_builder.build() {
            Ok(overrides) => {
                builder.overrides(overrides);
            }
            Err(e) => tracing::warn!("[walker] ignore patterns disabled: {e}"),
        }

        builder
            .build()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    crate::debug_event!("walker", "skipped", "{e}");
                    None
                }
            })
            .filter(move |entry| entry.file_type().is_some_and(|ft| keep(&ft)))
            .map(|entry| entry.into_path())
    }
}
