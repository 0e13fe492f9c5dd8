use clap::Parser;

use langsift::Settings;
use langsift::cli::commands::{init, roots, watch};
use langsift::cli::{IndexerAction, IndexerCli};
use langsift::sync::SyncEngine;

/// Open the index or exit: nothing else can proceed without it.
fn open_engine(settings: &Settings) -> SyncEngine {
    match SyncEngine::open(settings) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!(
                "[main] FATAL: cannot open index at {}: {e}",
                settings.index_path.display()
            );
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = IndexerCli::parse();

    let settings = Settings::load(cli.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        Settings::default()
    });
    langsift::logging::init_with_config(&settings.logging);

    let mut stdout = std::io::stdout();
    let result = match cli.action() {
        IndexerAction::Init => match cli.config.clone().or_else(Settings::default_config_path) {
            Some(config_path) => init::run(&settings, &config_path, &mut stdout),
            None => Err(anyhow::anyhow!(
                "no configuration directory found; pass --config <FILE>"
            )),
        },
        IndexerAction::Purge => roots::purge(&open_engine(&settings), &mut stdout),
        IndexerAction::Add(path) => roots::add(&open_engine(&settings), &path, &mut stdout),
        IndexerAction::Remove(path) => roots::remove(&open_engine(&settings), &path, &mut stdout),
        IndexerAction::List => roots::list(&open_engine(&settings), &mut stdout),
        IndexerAction::Reindex => roots::reindex(&open_engine(&settings), &mut stdout),
        IndexerAction::Watch => watch::run(open_engine(&settings), &settings).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
