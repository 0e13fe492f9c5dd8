//! Interactive session settings.

use std::fmt;

use super::error::{SearchError, SearchResult};
use crate::config::SearchConfig;
use crate::language::Language;

/// How raw input is turned into a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryMode {
    /// First analyzed token, exact match.
    #[default]
    Term,
    /// All analyzed tokens, in order, with stop-word gaps.
    Phrase,
    /// First analyzed token, up to two edits away.
    Fuzzy,
}

impl QueryMode {
    pub fn name(self) -> &'static str {
        match self {
            QueryMode::Term => "term",
            QueryMode::Phrase => "phrase",
            QueryMode::Fuzzy => "fuzzy",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "term" => Some(QueryMode::Term),
            "phrase" => Some(QueryMode::Phrase),
            "fuzzy" => Some(QueryMode::Fuzzy),
            _ => None,
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Settings for one interactive session.
///
/// Immutable: every setter validates its input and returns a new session,
/// so a rejected value leaves the current one untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchSession {
    language: Language,
    mode: QueryMode,
    limit: Option<usize>,
    details: bool,
    color: bool,
}

/// Validated setter taking the raw textual value.
type Setter = fn(&SearchSession, &str) -> SearchResult<SearchSession>;

impl SearchSession {
    /// Session defaults from configuration.
    ///
    /// Values are validated like interactive commands; invalid ones are
    /// logged and left at their built-in default.
    pub fn from_config(config: &SearchConfig) -> Self {
        let steps: [(&str, String, Setter); 5] = [
            ("language", config.language.clone(), Self::with_language),
            ("mode", config.mode.clone(), Self::with_mode_name),
            ("limit", config.limit.to_string(), Self::with_limit),
            ("details", on_off(config.details).to_string(), Self::with_details),
            ("color", on_off(config.color).to_string(), Self::with_color),
        ];

        let mut session = Self::default();
        for (name, value, setter) in steps {
            match setter(&session, &value) {
                Ok(updated) => session = updated,
                Err(e) => tracing::warn!("[search] ignoring configured {name}: {e}"),
            }
        }
        session
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn mode(&self) -> QueryMode {
        self.mode
    }

    /// Maximum number of hits, `None` when unbounded.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn details(&self) -> bool {
        self.details
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// Accepts `en` or `pl`.
    pub fn with_language(&self, value: &str) -> SearchResult<Self> {
        let language = Language::from_code(value).ok_or_else(|| invalid("language", value))?;
        Ok(Self {
            language,
            ..self.clone()
        })
    }

    pub fn with_mode(&self, mode: QueryMode) -> Self {
        Self {
            mode,
            ..self.clone()
        }
    }

    /// Accepts `term`, `phrase` or `fuzzy`.
    pub fn with_mode_name(&self, value: &str) -> SearchResult<Self> {
        let mode = QueryMode::parse(value).ok_or_else(|| invalid("mode", value))?;
        Ok(self.with_mode(mode))
    }

    /// Accepts a non-negative integer; `0` removes the limit.
    pub fn with_limit(&self, value: &str) -> SearchResult<Self> {
        let limit: usize = value.parse().map_err(|_| invalid("limit", value))?;
        Ok(Self {
            limit: (limit > 0).then_some(limit),
            ..self.clone()
        })
    }

    /// Accepts `on` or `off`.
    pub fn with_details(&self, value: &str) -> SearchResult<Self> {
        Ok(Self {
            details: parse_flag("details", value)?,
            ..self.clone()
        })
    }

    /// Accepts `on` or `off`.
    pub fn with_color(&self, value: &str) -> SearchResult<Self> {
        Ok(Self {
            color: parse_flag("color", value)?,
            ..self.clone()
        })
    }
}

fn parse_flag(setting: &'static str, value: &str) -> SearchResult<bool> {
    match value {
        "on" => Ok(true),
        "off" => Ok(false),
        _ => Err(invalid(setting, value)),
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

fn invalid(setting: &'static str, value: &str) -> SearchError {
    SearchError::InvalidSetting {
        setting,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let session = SearchSession::default();
        assert_eq!(session.language(), Language::English);
        assert_eq!(session.mode(), QueryMode::Term);
        assert_eq!(session.limit(), None);
        assert!(!session.details());
        assert!(!session.color());
    }

    #[test]
    fn test_setters_return_new_values() {
        let session = SearchSession::default();
        let polish = session.with_language("pl").unwrap();

        assert_eq!(polish.language(), Language::Polish);
        assert_eq!(session.language(), Language::English);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let session = SearchSession::default().with_limit("5").unwrap();

        for result in [
            session.with_language("de"),
            session.with_language("EN"),
            session.with_limit("-1"),
            session.with_limit("ten"),
            session.with_details("yes"),
            session.with_color("true"),
            session.with_mode_name("regex"),
        ] {
            assert!(matches!(result, Err(SearchError::InvalidSetting { .. })));
        }
        assert_eq!(session.limit(), Some(5));
    }

    #[test]
    fn test_limit_zero_is_unbounded() {
        let session = SearchSession::default()
            .with_limit("3")
            .unwrap()
            .with_limit("0")
            .unwrap();
        assert_eq!(session, SearchSession::default());
    }

    #[test]
    fn test_flags() {
        let session = SearchSession::default()
            .with_details("on")
            .unwrap()
            .with_color("on")
            .unwrap();
        assert!(session.details());
        assert!(session.color());

        let session = session.with_color("off").unwrap();
        assert!(!session.color());
        assert!(session.details());
    }

    #[test]
    fn test_from_config_skips_invalid_values() {
        let config = SearchConfig {
            language: "de".to_string(),
            mode: "fuzzy".to_string(),
            limit: 25,
            details: true,
            ..SearchConfig::default()
        };

        let session = SearchSession::from_config(&config);
        assert_eq!(session.language(), Language::English);
        assert_eq!(session.mode(), QueryMode::Fuzzy);
        assert_eq!(session.limit(), Some(25));
        assert!(session.details());
        assert!(!session.color());
    }
}
