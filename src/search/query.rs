//! Language-aware query construction.
//!
//! Input is analyzed with the same analyzer the target fields were indexed
//! with, so stemming and stop words line up on both sides. Every mode searches
//! the body and the file name of the session language, combined with OR.

use tantivy::Term;
use tantivy::query::{BooleanQuery, FuzzyTermQuery, Occur, PhraseQuery, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption};

use super::error::{SearchError, SearchResult};
use super::session::{QueryMode, SearchSession};
use crate::language::Language;
use crate::storage::DocumentSchema;
use crate::storage::analyzers::{self, AnalyzedToken};

/// Maximum edit distance in fuzzy mode.
const FUZZY_DISTANCE: u8 = 2;

/// A query built for one search call.
pub struct LanguageQuery {
    query: Box<dyn Query>,
    language: Language,
    mode: QueryMode,
    terms: Vec<AnalyzedToken>,
}

impl LanguageQuery {
    pub fn query(&self) -> &dyn Query {
        self.query.as_ref()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn mode(&self) -> QueryMode {
        self.mode
    }

    /// Analyzed terms the query matches on, with their phrase positions.
    pub fn terms(&self) -> &[AnalyzedToken] {
        &self.terms
    }
}

impl std::fmt::Debug for LanguageQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageQuery")
            .field("language", &self.language)
            .field("mode", &self.mode)
            .field("terms", &self.terms)
            .finish()
    }
}

/// Build the query for `raw` under the session's language and mode.
///
/// Term and fuzzy modes only use the first analyzed token of the input.
pub fn build_query(
    schema: &DocumentSchema,
    session: &SearchSession,
    raw: &str,
) -> SearchResult<LanguageQuery> {
    let language = session.language();
    let mode = session.mode();
    let mut tokens = analyzers::analyze(language, raw);
    if tokens.is_empty() {
        return Err(SearchError::NoTerm);
    }

    let fields = [schema.body(language), schema.name(language)];
    let per_field: Vec<Box<dyn Query>> = match mode {
        QueryMode::Term => {
            tokens.truncate(1);
            fields
                .iter()
                .map(|&field| term_query(field, &tokens[0].text))
                .collect()
        }
        QueryMode::Fuzzy => {
            tokens.truncate(1);
            fields
                .iter()
                .map(|&field| {
                    let term = Term::from_field_text(field, &tokens[0].text);
                    Box::new(FuzzyTermQuery::new(term, FUZZY_DISTANCE, true)) as Box<dyn Query>
                })
                .collect()
        }
        QueryMode::Phrase => fields
            .iter()
            .map(|&field| phrase_query(field, &tokens))
            .collect(),
    };

    crate::debug_event!(
        "search",
        "query",
        "{mode} [{language}] {:?}",
        tokens.iter().map(|t| t.text.as_str()).collect::<Vec<_>>()
    );

    let clauses = per_field
        .into_iter()
        .map(|query| (Occur::Should, query))
        .collect();

    Ok(LanguageQuery {
        query: Box::new(BooleanQuery::new(clauses)),
        language,
        mode,
        terms: tokens,
    })
}

fn term_query(field: Field, text: &str) -> Box<dyn Query> {
    let term = Term::from_field_text(field, text);
    Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs))
}

/// Phrase over `tokens`, keeping the gaps left by removed stop words.
fn phrase_query(field: Field, tokens: &[AnalyzedToken]) -> Box<dyn Query> {
    if tokens.len() == 1 {
        return term_query(field, &tokens[0].text);
    }

    let start = tokens[0].position;
    let terms = tokens
        .iter()
        .map(|token| {
            (
                token.position - start,
                Term::from_field_text(field, &token.text),
            )
        })
        .collect();
    Box::new(PhraseQuery::new_with_offset(terms))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(mode: QueryMode) -> SearchSession {
        SearchSession::default().with_mode(mode)
    }

    fn term_texts(query: &LanguageQuery) -> Vec<&str> {
        query.terms().iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_term_mode_keeps_first_token() {
        let (_, schema) = DocumentSchema::build();
        let query = build_query(&schema, &session(QueryMode::Term), "Quick brown fox").unwrap();

        assert_eq!(term_texts(&query), vec!["quick"]);
        assert_eq!(query.language(), Language::English);
    }

    #[test]
    fn test_fuzzy_mode_keeps_first_token() {
        let (_, schema) = DocumentSchema::build();
        let query = build_query(&schema, &session(QueryMode::Fuzzy), "the quikc fox").unwrap();

        assert_eq!(term_texts(&query), vec!["quikc"]);
        assert_eq!(query.mode(), QueryMode::Fuzzy);
    }

    #[test]
    fn test_phrase_mode_keeps_all_tokens_and_gaps() {
        let (_, schema) = DocumentSchema::build();
        let query =
            build_query(&schema, &session(QueryMode::Phrase), "keeper of the light").unwrap();

        let positions: Vec<usize> = query.terms().iter().map(|t| t.position).collect();
        assert_eq!(query.terms().len(), 2);
        assert_eq!(positions, vec![0, 3]);
    }

    #[test]
    fn test_stop_words_only_is_no_term() {
        let (_, schema) = DocumentSchema::build();
        for mode in [QueryMode::Term, QueryMode::Phrase, QueryMode::Fuzzy] {
            assert!(matches!(
                build_query(&schema, &session(mode), "the of"),
                Err(SearchError::NoTerm)
            ));
        }
        assert!(matches!(
            build_query(&schema, &session(QueryMode::Term), "  "),
            Err(SearchError::NoTerm)
        ));
    }

    #[test]
    fn test_polish_session_uses_polish_analyzer() {
        let (_, schema) = DocumentSchema::build();
        let polish = SearchSession::default().with_language("pl").unwrap();
        let query = build_query(&schema, &polish, "i Latarnik").unwrap();

        assert_eq!(term_texts(&query), vec!["latarnik"]);
        assert_eq!(query.language(), Language::Polish);
    }
}
