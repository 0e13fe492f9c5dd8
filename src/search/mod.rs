//! Query translation: session settings, language-aware query building,
//! execution and result rendering.

mod error;
mod highlight;
mod query;
mod render;
pub mod repl;
mod session;
mod translator;

pub use error::{SearchError, SearchResult};
pub use highlight::Highlighter;
pub use query::{LanguageQuery, build_query};
pub use render::render_results;
pub use session::{QueryMode, SearchSession};
pub use translator::{Hit, QueryTranslator, SearchResults};
