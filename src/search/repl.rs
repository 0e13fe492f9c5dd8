//! Line-oriented interactive search loop.

use std::io::{BufRead, Write};

use super::error::{SearchError, SearchResult};
use super::session::{QueryMode, SearchSession};
use super::translator::QueryTranslator;

pub const PROMPT: &str = "> ";

pub const USAGE: &str = "Usage: langsift-search [%lang en/pl] [%details on/off] [%color on/off] \
                         [%limit num] [%term/phrase/fuzzy] [query]";

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Lang(&'a str),
    Details(&'a str),
    Color(&'a str),
    Limit(&'a str),
    Mode(QueryMode),
    Query(&'a str),
    /// Empty input or a malformed meta-command.
    Usage,
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Self {
        if line.is_empty() {
            return Command::Usage;
        }
        if !line.starts_with('%') {
            return Command::Query(line);
        }

        let parts: Vec<&str> = line.split(' ').collect();
        match parts.as_slice() {
            ["%lang", value] => Command::Lang(*value),
            ["%details", value] => Command::Details(*value),
            ["%color", value] => Command::Color(*value),
            ["%limit", value] => Command::Limit(*value),
            ["%term"] => Command::Mode(QueryMode::Term),
            ["%phrase"] => Command::Mode(QueryMode::Phrase),
            ["%fuzzy"] => Command::Mode(QueryMode::Fuzzy),
            _ => Command::Usage,
        }
    }
}

/// Apply one line to `session`, running queries against `translator`.
///
/// Returns the session to use for the next line. Rejected settings and
/// failed queries are logged and leave the session unchanged; only
/// output failures are returned.
pub fn execute_line(
    translator: &QueryTranslator,
    session: SearchSession,
    line: &str,
    out: &mut impl Write,
) -> SearchResult<SearchSession> {
    let updated = match Command::parse(line) {
        Command::Lang(value) => session.with_language(value),
        Command::Details(value) => session.with_details(value),
        Command::Color(value) => session.with_color(value),
        Command::Limit(value) => session.with_limit(value),
        Command::Mode(mode) => Ok(session.with_mode(mode)),
        Command::Usage => {
            writeln!(out, "{USAGE}")?;
            return Ok(session);
        }
        Command::Query(raw) => {
            match translator.search(&session, raw, out) {
                Ok(_) => {}
                Err(SearchError::Output(e)) => return Err(e.into()),
                Err(e) => tracing::warn!("[search] query failed: {e}"),
            }
            return Ok(session);
        }
    };

    match updated {
        Ok(next) => {
            crate::debug_event!("search", "session", "{next:?}");
            Ok(next)
        }
        Err(e) => {
            tracing::warn!("[search] {e}");
            Ok(session)
        }
    }
}

/// Prompt, read and execute lines until end of input.
pub fn run_interactive(
    translator: &QueryTranslator,
    mut session: SearchSession,
    input: impl BufRead,
    out: &mut impl Write,
) -> SearchResult<SearchSession> {
    write!(out, "{PROMPT}")?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        session = execute_line(translator, session, line, out)?;
        write!(out, "{PROMPT}")?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(session)
}
