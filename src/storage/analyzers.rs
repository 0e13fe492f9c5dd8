//! Per-language text analyzers.
//!
//! English gets the Lucene-style pipeline: simple tokenization, lowercasing,
//! the classic English stop set and Porter stemming. Polish has no stemmer in
//! tantivy, so it stops after lowercasing and stop-word removal.
//!
//! Stop words are dropped without renumbering positions, which keeps the gaps
//! that phrase queries rely on.

use tantivy::Index;
use tantivy::tokenizer::{
    Language as StemmerLanguage, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer,
    StopWordFilter, TextAnalyzer, TokenStream,
};

use crate::language::Language;

/// Tokens longer than this many bytes are dropped.
const MAX_TOKEN_LEN: usize = 40;

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

const POLISH_STOP_WORDS: &[&str] = &[
    "a", "aby", "ale", "bo", "by", "być", "czy", "do", "i", "ich", "jak", "jako", "jest", "już",
    "lub", "na", "nie", "o", "od", "oraz", "po", "przez", "się", "ta", "tak", "te", "to", "w",
    "we", "z", "za", "ze", "że",
];

/// Name under which the analyzer for `language` is registered.
pub fn tokenizer_name(language: Language) -> &'static str {
    match language {
        Language::English => "lang_en",
        Language::Polish => "lang_pl",
    }
}

/// Build a fresh analyzer for `language`.
pub fn analyzer(language: Language) -> TextAnalyzer {
    match language {
        Language::English => TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
            .filter(LowerCaser)
            .filter(stop_words(ENGLISH_STOP_WORDS))
            .filter(Stemmer::new(StemmerLanguage::English))
            .build(),
        Language::Polish => TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
            .filter(LowerCaser)
            .filter(stop_words(POLISH_STOP_WORDS))
            .build(),
    }
}

fn stop_words(words: &[&str]) -> StopWordFilter {
    StopWordFilter::remove(words.iter().map(|word| word.to_string()))
}

/// Register every language analyzer on `index`.
///
/// Tokenizers are not persisted with the index, so this runs on every open.
pub fn register(index: &Index) {
    for language in Language::ALL {
        index
            .tokenizers()
            .register(tokenizer_name(language), analyzer(language));
    }
}

/// A token produced by a language analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedToken {
    pub text: String,
    /// Position in the original token sequence, stop words included.
    pub position: usize,
    /// Byte range in the analyzed text.
    pub offset_from: usize,
    pub offset_to: usize,
}

/// Run `text` through the analyzer for `language`.
pub fn analyze(language: Language, text: &str) -> Vec<AnalyzedToken> {
    let mut analyzer = analyzer(language);
    let mut stream = analyzer.token_stream(text);
    let mut tokens = Vec::new();
    while stream.advance() {
        let token = stream.token();
        tokens.push(AnalyzedToken {
            text: token.text.clone(),
            position: token.position,
            offset_from: token.offset_from,
            offset_to: token.offset_to,
        });
    }
    tokens
}
