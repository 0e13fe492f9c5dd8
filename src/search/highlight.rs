//! Excerpt fragments with matched terms marked.
//!
//! The stored body is re-analyzed with the query language's analyzer so
//! matches are found on the same normalized tokens the index holds, then
//! mapped back to byte offsets in the original text.

use std::collections::HashMap;

use console::Style;

use super::query::LanguageQuery;
use super::session::QueryMode;
use crate::storage::analyzers::{self, AnalyzedToken};

const PLAIN_OPEN: &str = "<B>";
const PLAIN_CLOSE: &str = "</B>";

/// Splits bodies into fragments and keeps the best-scoring ones.
#[derive(Debug, Clone)]
pub struct Highlighter {
    max_fragments: usize,
    fragment_chars: usize,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(10, 100)
    }
}

#[derive(Debug)]
struct Fragment {
    start: usize,
    end: usize,
    spans: Vec<(usize, usize)>,
}

impl Highlighter {
    pub fn new(max_fragments: usize, fragment_chars: usize) -> Self {
        Self {
            max_fragments,
            fragment_chars: fragment_chars.max(1),
        }
    }

    /// Up to `max_fragments` marked excerpts of `body`, best first.
    ///
    /// Fragments without any match are left out.
    pub fn fragments(&self, query: &LanguageQuery, body: &str, color: bool) -> Vec<String> {
        let tokens = analyzers::analyze(query.language(), body);
        let matched = matched_tokens(query, &tokens);
        if !matched.contains(&true) {
            return Vec::new();
        }

        let mut fragments = self.split(body, &tokens, &matched);
        fragments.retain(|fragment| !fragment.spans.is_empty());
        // Stable sort keeps document order among equal scores
        fragments.sort_by(|a, b| b.spans.len().cmp(&a.spans.len()));
        fragments.truncate(self.max_fragments);

        fragments
            .iter()
            .map(|fragment| mark(body, fragment, color))
            .collect()
    }

    /// Cut `body` at token boundaries roughly every `fragment_chars` bytes.
    fn split(&self, body: &str, tokens: &[AnalyzedToken], matched: &[bool]) -> Vec<Fragment> {
        let mut fragments = Vec::new();
        let mut current = Fragment {
            start: 0,
            end: body.len(),
            spans: Vec::new(),
        };

        for (token, is_match) in tokens.iter().zip(matched) {
            if token.offset_to > current.start + self.fragment_chars
                && token.offset_from > current.start
            {
                let next_start = token.offset_from;
                current.end = next_start;
                fragments.push(current);
                current = Fragment {
                    start: next_start,
                    end: body.len(),
                    spans: Vec::new(),
                };
            }
            if *is_match {
                current.spans.push((token.offset_from, token.offset_to));
            }
        }
        fragments.push(current);
        fragments
    }
}

/// Which body tokens take part in a match of `query`.
fn matched_tokens(query: &LanguageQuery, tokens: &[AnalyzedToken]) -> Vec<bool> {
    let terms = query.terms();
    let mut matched = vec![false; tokens.len()];
    let Some(first) = terms.first() else {
        return matched;
    };

    match query.mode() {
        QueryMode::Term => {
            for (flag, token) in matched.iter_mut().zip(tokens) {
                *flag = token.text == first.text;
            }
        }
        QueryMode::Fuzzy => {
            for (flag, token) in matched.iter_mut().zip(tokens) {
                *flag = edit_distance(&token.text, &first.text) <= 2;
            }
        }
        QueryMode::Phrase => {
            let by_position: HashMap<usize, usize> = tokens
                .iter()
                .enumerate()
                .map(|(index, token)| (token.position, index))
                .collect();

            for token in tokens.iter().filter(|t| t.text == first.text) {
                let hit: Option<Vec<usize>> = terms
                    .iter()
                    .map(|term| {
                        let position = token.position + (term.position - first.position);
                        by_position
                            .get(&position)
                            .copied()
                            .filter(|&index| tokens[index].text == term.text)
                    })
                    .collect();
                for index in hit.into_iter().flatten() {
                    matched[index] = true;
                }
            }
        }
    }
    matched
}

fn mark(body: &str, fragment: &Fragment, color: bool) -> String {
    let red = Style::new().red().force_styling(true);
    let mut out = String::with_capacity(fragment.end - fragment.start + 16);
    let mut cursor = fragment.start;

    for &(from, to) in &fragment.spans {
        out.push_str(&body[cursor..from]);
        let text = &body[from..to];
        if color {
            out.push_str(&red.apply_to(text).to_string());
        } else {
            out.push_str(PLAIN_OPEN);
            out.push_str(text);
            out.push_str(PLAIN_CLOSE);
        }
        cursor = to;
    }
    out.push_str(&body[cursor..fragment.end]);

    out.trim().to_string()
}

/// Optimal string alignment distance: insertions, deletions, substitutions
/// and adjacent transpositions each cost one.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (m, n) = (a.len(), b.len());

    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=n {
        dp[0][j] = j;
    }

    for i in 1..=m {
        for j in 1..=n {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            dp[i][j] = (dp[i - 1][j] + 1)
                .min(dp[i][j - 1] + 1)
                .min(dp[i - 1][j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                dp[i][j] = dp[i][j].min(dp[i - 2][j - 2] + 1);
            }
        }
    }
    dp[m][n]
}
