//! CLI argument parsing using clap.

use clap::{
    ArgGroup, Parser,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Language-aware full-text indexer
#[derive(Parser, Debug)]
#[command(
    name = "langsift",
    version = env!("CARGO_PKG_VERSION"),
    about = "Keep a language-aware full-text index in sync with watched directories",
    long_about = "Index English and Polish text files under watched directories.\n\
                  Without an action, runs in watch mode and keeps the index in sync \
                  with filesystem changes until interrupted.",
    styles = clap_cargo_style(),
    group(ArgGroup::new("action").multiple(false))
)]
pub struct IndexerCli {
    /// Path to custom settings.toml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Delete every document and watched root from the index
    #[arg(long, group = "action")]
    pub purge: bool,

    /// Register a directory as a watched root and index it
    #[arg(long, value_name = "PATH", group = "action")]
    pub add: Option<PathBuf>,

    /// Unregister a watched root and drop its documents
    #[arg(long, value_name = "PATH", group = "action")]
    pub rm: Option<PathBuf>,

    /// List watched roots
    #[arg(long, group = "action")]
    pub list: bool,

    /// Rebuild the index from the watched roots
    #[arg(long, group = "action")]
    pub reindex: bool,

    /// Write the effective settings to the config file (`--config` or the per-user default)
    #[arg(long, group = "action")]
    pub init: bool,
}

/// What the indexer should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexerAction {
    Purge,
    Add(PathBuf),
    Remove(PathBuf),
    List,
    Reindex,
    Init,
    Watch,
}

impl IndexerCli {
    pub fn action(&self) -> IndexerAction {
        if self.purge {
            IndexerAction::Purge
        } else if let Some(path) = &self.add {
            IndexerAction::Add(path.clone())
        } else if let Some(path) = &self.rm {
            IndexerAction::Remove(path.clone())
        } else if self.list {
            IndexerAction::List
        } else if self.reindex {
            IndexerAction::Reindex
        } else if self.init {
            IndexerAction::Init
        } else {
            IndexerAction::Watch
        }
    }
}

/// Interactive search over the langsift index
#[derive(Parser, Debug)]
#[command(
    name = "langsift-search",
    version = env!("CARGO_PKG_VERSION"),
    about = "Interactive search over the langsift index",
    long_about = "Reads queries from standard input. Lines starting with '%' change \
                  session settings: %lang en|pl, %details on|off, %color on|off, \
                  %limit N (0 = unbounded), %term, %phrase, %fuzzy.",
    styles = clap_cargo_style()
)]
pub struct SearchCli {
    /// Path to custom settings.toml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
