//! One-shot indexer actions over the set of watched roots.

use std::io::Write;
use std::path::Path;

use anyhow::Context;

use crate::sync::SyncEngine;

/// Register `path` as a watched root and index everything under it.
pub fn add(engine: &SyncEngine, path: &Path, out: &mut impl Write) -> anyhow::Result<()> {
    let stats = engine
        .add_tree(path, true)
        .with_context(|| format!("failed to add {}", path.display()))?;
    writeln!(
        out,
        "Added {}: {} file(s) indexed, {} skipped",
        path.display(),
        stats.indexed,
        stats.skipped
    )?;
    Ok(())
}

/// Unregister `path` and drop the documents under it.
pub fn remove(engine: &SyncEngine, path: &Path, out: &mut impl Write) -> anyhow::Result<()> {
    engine
        .remove_tree(path)
        .with_context(|| format!("failed to remove {}", path.display()))?;
    writeln!(out, "Removed {}", path.display())?;
    Ok(())
}

/// Print each watched root on its own line.
pub fn list(engine: &SyncEngine, out: &mut impl Write) -> anyhow::Result<()> {
    for root in engine.list_roots().context("failed to list watched roots")? {
        writeln!(out, "{}", root.display())?;
    }
    Ok(())
}

pub fn purge(engine: &SyncEngine, out: &mut impl Write) -> anyhow::Result<()> {
    engine.purge_all().context("failed to purge the index")?;
    writeln!(out, "Index purged")?;
    Ok(())
}

/// Rebuild every document from the roots that still exist.
pub fn reindex(engine: &SyncEngine, out: &mut impl Write) -> anyhow::Result<()> {
    let stats = engine.reindex().context("failed to rebuild the index")?;
    writeln!(
        out,
        "Reindexed: {} file(s) indexed, {} skipped",
        stats.indexed, stats.skipped
    )?;
    Ok(())
}
