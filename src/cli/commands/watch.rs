//! Watch mode: keep the index in sync until interrupted.

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::sync::SyncEngine;
use crate::watcher::Monitor;

/// Run the watch loop until Ctrl+C.
pub async fn run(engine: SyncEngine, settings: &Settings) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let monitor = Monitor::from_settings(engine, settings, cancel.clone())
        .context("failed to start the file watcher")?;

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => eprintln!("Received shutdown signal"),
            Err(e) => tracing::warn!("[watcher] cannot listen for ctrl+c: {e}"),
        }
        shutdown.cancel();
    });

    eprintln!("Watching for changes (Ctrl+C to stop)");
    monitor.run().await.context("watch loop stopped")?;
    Ok(())
}
