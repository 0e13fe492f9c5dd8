//! Supported index languages and the language identification seam.

use std::fmt;

use whatlang::Lang;

/// Languages with their own field set in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Language {
    #[default]
    English,
    Polish,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Polish];

    /// Two-letter code used in field names and session commands.
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Polish => "pl",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Language::English),
            "pl" => Some(Language::Polish),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Result of running language identification over extracted text.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageGuess {
    /// `en`/`pl` for supported languages, ISO 639-3 otherwise.
    pub code: String,
    /// Whether the identifier is confident enough to act on the guess.
    pub reliable: bool,
    pub confidence: f64,
}

impl LanguageGuess {
    /// The index language this guess maps to, if any.
    pub fn supported(&self) -> Option<Language> {
        Language::from_code(&self.code)
    }
}

/// Identifies the natural language of a text.
///
/// Returns `None` when the text carries no usable signal at all
/// (empty, punctuation only).
pub trait LanguageIdentifier: Send + Sync {
    fn identify(&self, text: &str) -> Option<LanguageGuess>;
}

/// Trigram-based identification backed by `whatlang`.
#[derive(Debug, Clone)]
pub struct WhatlangIdentifier {
    min_confidence: f64,
}

impl WhatlangIdentifier {
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence }
    }
}

impl Default for WhatlangIdentifier {
    fn default() -> Self {
        Self::new(0.9)
    }
}

impl LanguageIdentifier for WhatlangIdentifier {
    fn identify(&self, text: &str) -> Option<LanguageGuess> {
        let info = whatlang::detect(text)?;
        let code = match info.lang() {
            Lang::Eng => Language::English.code().to_string(),
            Lang::Pol => Language::Polish.code().to_string(),
            other => other.code().to_string(),
        };

        Some(LanguageGuess {
            code,
            reliable: info.confidence() >= self.min_confidence,
            confidence: info.confidence(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENGLISH: &str = "The lighthouse keeper climbed the narrow stairs every evening \
        to light the great lamp, and from the gallery he watched the fishing boats \
        return to the harbour before the storm reached the rocky coast.";

    const POLISH: &str = "Latarnik każdego wieczoru wspinał się po wąskich schodach, \
        żeby zapalić wielką lampę, a z galerii obserwował łodzie rybackie, które \
        wracały do portu, zanim burza dotarła do skalistego wybrzeża.";

    const GERMAN: &str = "Der Leuchtturmwärter stieg jeden Abend die schmalen Treppen \
        hinauf, um die große Lampe anzuzünden, und von der Galerie aus beobachtete er \
        die Fischerboote, die vor dem Sturm in den Hafen zurückkehrten.";

    #[test]
    fn test_language_codes_roundtrip() {
        for language in Language::ALL {
            assert_eq!(Language::from_code(language.code()), Some(language));
        }
        assert_eq!(Language::from_code("de"), None);
        assert_eq!(Language::from_code("EN"), None);
    }

    #[test]
    fn test_identify_english() {
        let guess = WhatlangIdentifier::default().identify(ENGLISH).unwrap();
        assert_eq!(guess.supported(), Some(Language::English));
        assert!(guess.reliable, "confidence was {}", guess.confidence);
    }

    #[test]
    fn test_identify_polish() {
        let guess = WhatlangIdentifier::default().identify(POLISH).unwrap();
        assert_eq!(guess.supported(), Some(Language::Polish));
        assert!(guess.reliable, "confidence was {}", guess.confidence);
    }

    #[test]
    fn test_identify_unsupported_language() {
        let guess = WhatlangIdentifier::default().identify(GERMAN).unwrap();
        assert_eq!(guess.code, "deu");
        assert_eq!(guess.supported(), None);
    }

    #[test]
    fn test_threshold_above_one_is_never_reliable() {
        let guess = WhatlangIdentifier::new(1.1).identify(ENGLISH).unwrap();
        assert!(!guess.reliable);
    }
}
