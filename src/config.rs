//! Layered configuration for the indexer and the search shell.
//!
//! Sources, lowest precedence first:
//! - Built-in defaults
//! - TOML settings file (`<config_dir>/langsift/settings.toml` or `--config`)
//! - Environment variables
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `LANGSIFT_` and use double
//! underscores to separate nested levels:
//! - `LANGSIFT_INDEX_PATH=/tmp/idx` sets `index_path`
//! - `LANGSIFT_WATCH__DEBOUNCE_MS=100` sets `watch.debounce_ms`
//! - `LANGSIFT_SEARCH__LANGUAGE=pl` sets `search.language`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "LANGSIFT_";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory holding the tantivy index
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    #[serde(default)]
    pub indexing: IndexingConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    /// Defaults for new search sessions and result rendering
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IndexingConfig {
    /// Glob patterns excluded from every tree walk
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Memory budget handed to each tantivy write session
    #[serde(default = "default_writer_heap_bytes")]
    pub writer_heap_bytes: usize,

    /// Minimum identifier confidence (0.0 - 1.0) before a language is trusted
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WatchConfig {
    /// Quiet period before a modified file is re-indexed
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Capacity of the queue between the notify callback and the watch loop
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_language")]
    pub language: String,

    /// One of `term`, `phrase`, `fuzzy`
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Maximum hits per query, 0 = unbounded
    #[serde(default)]
    pub limit: usize,

    #[serde(default = "default_false")]
    pub details: bool,

    #[serde(default = "default_false")]
    pub color: bool,

    /// Highlighted fragments printed per hit in detail mode
    #[serde(default = "default_max_fragments")]
    pub max_fragments: usize,

    /// Approximate fragment length in characters
    #[serde(default = "default_fragment_chars")]
    pub fragment_chars: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level for every target (`error`, `warn`, `info`, `debug`, `trace`)
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-target overrides, e.g. `langsift::watcher = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_version() -> u32 {
    1
}
fn default_index_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".index")
}
fn default_writer_heap_bytes() -> usize {
    50_000_000
}
fn default_min_confidence() -> f64 {
    0.9
}
fn default_debounce_ms() -> u64 {
    300
}
fn default_channel_capacity() -> usize {
    256
}
fn default_language() -> String {
    "en".to_string()
}
fn default_mode() -> String {
    "term".to_string()
}
fn default_false() -> bool {
    false
}
fn default_max_fragments() -> usize {
    10
}
fn default_fragment_chars() -> usize {
    100
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            index_path: default_index_path(),
            indexing: IndexingConfig::default(),
            watch: WatchConfig::default(),
            search: SearchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            writer_heap_bytes: default_writer_heap_bytes(),
            min_confidence: default_min_confidence(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            mode: default_mode(),
            limit: 0,
            details: false,
            color: false,
            max_fragments: default_max_fragments(),
            fragment_chars: default_fragment_chars(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources.
    ///
    /// `custom_path` replaces the per-user settings file when given.
    pub fn load(custom_path: Option<&Path>) -> Result<Self, Box<figment::Error>> {
        let config_path = custom_path
            .map(Path::to_path_buf)
            .or_else(Self::default_config_path);

        let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment
            // Double underscore separates nesting levels, single underscore
            // stays part of the field name.
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".")
                    .into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Load configuration from a specific file, ignoring the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .extract()
            .map_err(Box::new)
    }

    /// Per-user settings file location.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("langsift").join("settings.toml"))
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.version, 1);
        assert!(settings.index_path.ends_with(".index"));
        assert_eq!(settings.search.language, "en");
        assert_eq!(settings.search.mode, "term");
        assert_eq!(settings.search.limit, 0);
        assert_eq!(settings.search.max_fragments, 10);
        assert!(settings.indexing.ignore_patterns.is_empty());
        assert_eq!(settings.logging.default, "warn");
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        let toml_content = r#"
index_path = "/var/lib/langsift"

[indexing]
ignore_patterns = ["*.log"]
min_confidence = 0.75

[search]
language = "pl"
mode = "fuzzy"
limit = 25
details = true

[logging]
default = "info"

[logging.modules]
"langsift::watcher" = "debug"
"#;
        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.index_path, PathBuf::from("/var/lib/langsift"));
        assert_eq!(settings.indexing.ignore_patterns, vec!["*.log"]);
        assert!((settings.indexing.min_confidence - 0.75).abs() < f64::EPSILON);
        assert_eq!(settings.search.language, "pl");
        assert_eq!(settings.search.mode, "fuzzy");
        assert_eq!(settings.search.limit, 25);
        assert!(settings.search.details);
        assert!(!settings.search.color);
        assert_eq!(settings.logging.default, "info");
        assert_eq!(settings.logging.modules["langsift::watcher"], "debug");
    }

    #[test]
    fn test_partial_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        fs::write(&config_path, "[watch]\ndebounce_ms = 1000\n").unwrap();

        let settings = Settings::load_from(&config_path).unwrap();

        assert_eq!(settings.watch.debounce_ms, 1000);
        // Everything else keeps its default
        assert_eq!(settings.watch.channel_capacity, 256);
        assert_eq!(settings.indexing.writer_heap_bytes, 50_000_000);
        assert_eq!(settings.search.fragment_chars, 100);
    }

    #[test]
    fn test_save_settings() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("settings.toml");

        let mut settings = Settings::default();
        settings.index_path = temp_dir.path().join("idx");
        settings.search.color = true;
        settings.watch.debounce_ms = 50;

        settings.save(&config_path).unwrap();

        let loaded = Settings::load_from(&config_path).unwrap();
        assert_eq!(loaded.index_path, temp_dir.path().join("idx"));
        assert!(loaded.search.color);
        assert_eq!(loaded.watch.debounce_ms, 50);
    }

    #[test]
    fn test_env_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "[search]\nmax_fragments = 3\nfragment_chars = 80\n").unwrap();

        unsafe {
            std::env::set_var("LANGSIFT_SEARCH__MAX_FRAGMENTS", "7");
        }

        let settings = Settings::load(Some(&config_path)).unwrap();

        // Environment variable wins over the file
        assert_eq!(settings.search.max_fragments, 7);
        // File value is used when no env var is set
        assert_eq!(settings.search.fragment_chars, 80);

        unsafe {
            std::env::remove_var("LANGSIFT_SEARCH__MAX_FRAGMENTS");
        }
    }
}
