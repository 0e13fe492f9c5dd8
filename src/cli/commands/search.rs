//! Interactive search session on stdin/stdout.

use std::io;

use anyhow::Context;

use crate::config::Settings;
use crate::search::{QueryTranslator, SearchSession, repl};

pub fn run(settings: &Settings) -> anyhow::Result<()> {
    let translator = QueryTranslator::open(settings).with_context(|| {
        format!("failed to open index at {}", settings.index_path.display())
    })?;
    let session = SearchSession::from_config(&settings.search);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    repl::run_interactive(&translator, session, stdin.lock(), &mut stdout)
        .context("search session failed")?;
    Ok(())
}
