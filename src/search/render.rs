use std::io::Write;

use console::Style;

use super::error::SearchResult;
use super::highlight::Highlighter;
use super::query::LanguageQuery;
use super::session::SearchSession;
use super::translator::SearchResults;

/// Print the total match count, then each hit's path.
///
/// With details on, the path is emphasized and followed by highlighted
/// fragments of the body.
pub fn render_results(
    results: &SearchResults,
    query: &LanguageQuery,
    session: &SearchSession,
    highlighter: &Highlighter,
    out: &mut impl Write,
) -> SearchResult<()> {
    writeln!(out, "File count: {}", results.total)?;

    let bold = Style::new().bold().force_styling(true);
    for hit in &results.hits {
        writeln!(out)?;
        if !session.details() {
            writeln!(out, "{}", hit.path)?;
            continue;
        }

        writeln!(out, "{}", bold.apply_to(&hit.path))?;
        for fragment in highlighter.fragments(query, &hit.body, session.color()) {
            writeln!(out, "{fragment}")?;
        }
    }
    out.flush()?;
    Ok(())
}
