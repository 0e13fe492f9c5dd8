//! Query execution against the shared on-disk index.

use tantivy::TantivyDocument;
use tantivy::collector::{Count, TopDocs};
use tantivy::schema::Value;

use super::error::SearchResult;
use super::highlight::Highlighter;
use super::query::{LanguageQuery, build_query};
use super::render::render_results;
use super::session::SearchSession;
use crate::config::Settings;
use crate::storage::IndexStore;

/// One ranked result.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub score: f32,
    /// Stored canonical path of the file.
    pub path: String,
    /// Stored body in the query language.
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    /// Number of matching documents, regardless of the limit.
    pub total: usize,
    pub hits: Vec<Hit>,
}

/// Read-only search front end: builds, executes and renders queries.
pub struct QueryTranslator {
    store: IndexStore,
    highlighter: Highlighter,
}

impl QueryTranslator {
    pub fn new(store: IndexStore, highlighter: Highlighter) -> Self {
        Self { store, highlighter }
    }

    /// Open the configured index for searching.
    pub fn open(settings: &Settings) -> SearchResult<Self> {
        let store = IndexStore::open(&settings.index_path, settings.indexing.writer_heap_bytes)?;
        let highlighter =
            Highlighter::new(settings.search.max_fragments, settings.search.fragment_chars);
        Ok(Self::new(store, highlighter))
    }

    pub fn build_query(&self, session: &SearchSession, raw: &str) -> SearchResult<LanguageQuery> {
        build_query(self.store.schema(), session, raw)
    }

    /// Run `query`, returning at most `limit` hits (`None` for all of them).
    pub fn execute(&self, query: &LanguageQuery, limit: Option<usize>) -> SearchResult<SearchResults> {
        // Pick up whatever the indexer committed since the last query
        self.store.reload()?;
        let searcher = self.store.searcher();

        // Never ask the collector for more slots than there are documents
        let all = (searcher.num_docs() as usize).max(1);
        let limit = limit.filter(|&n| n > 0).map_or(all, |n| n.min(all));

        let (top_docs, total) =
            searcher.search(query.query(), &(TopDocs::with_limit(limit), Count))?;

        let schema = self.store.schema();
        let body_field = schema.body(query.language());
        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address)?;
            let path = doc
                .get_first(schema.full_path)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let body = doc
                .get_first(body_field)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            hits.push(Hit { score, path, body });
        }

        crate::debug_event!("search", "executed", "{total} total, {} returned", hits.len());
        Ok(SearchResults { total, hits })
    }

    pub fn render_results(
        &self,
        results: &SearchResults,
        query: &LanguageQuery,
        session: &SearchSession,
        out: &mut impl std::io::Write,
    ) -> SearchResult<()> {
        render_results(results, query, session, &self.highlighter, out)
    }

    /// Build, execute and render `raw` in one step.
    pub fn search(
        &self,
        session: &SearchSession,
        raw: &str,
        out: &mut impl std::io::Write,
    ) -> SearchResult<SearchResults> {
        let query = self.build_query(session, raw)?;
        let results = self.execute(&query, session.limit())?;
        self.render_results(&results, &query, session, out)?;
        Ok(results)
    }
}
