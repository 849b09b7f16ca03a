//! Configuration management for cashfeed
//!
//! This module handles loading, validation, and management of
//! cashfeed configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::{ConfigError, ConfigResult};

// ==================== Configuration Types ====================

/// Feed pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Records requested per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Give up on a page fetch after this many milliseconds
    #[serde(default)]
    pub fetch_timeout_ms: Option<u64>,
    /// Upper bound on simulated visibility events in the CLI
    #[serde(default = "default_max_scroll_events")]
    pub max_scroll_events: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            fetch_timeout_ms: None,
            max_scroll_events: default_max_scroll_events(),
        }
    }
}

fn default_page_size() -> usize {
    20
}

fn default_max_scroll_events() -> usize {
    100
}

/// Record store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON fixture seeding the in-memory store
    #[serde(default = "default_fixture")]
    pub fixture: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            fixture: default_fixture(),
        }
    }
}

fn default_fixture() -> PathBuf {
    PathBuf::from("./data/feed.json")
}

/// Forecast overlay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Merge forecasts into the feed
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Currency and number formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Currency symbol shown next to amounts
    #[serde(default = "default_currency")]
    pub symbol: String,
    /// Number of decimal places
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
    /// Thousands separator
    #[serde(default = "default_thousands_sep")]
    pub thousands_separator: String,
    /// Decimal separator
    #[serde(default = "default_decimal_sep")]
    pub decimal_separator: String,
    /// Currency symbol position ("before" or "after")
    #[serde(default = "default_symbol_position")]
    pub symbol_position: SymbolPosition,
    /// Prefix money in with an explicit "+"
    #[serde(default = "default_true")]
    pub show_plus_sign: bool,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            symbol: default_currency(),
            decimal_places: 2,
            thousands_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
            symbol_position: SymbolPosition::Before,
            show_plus_sign: true,
        }
    }
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_decimal_places() -> u32 {
    2
}

fn default_thousands_sep() -> String {
    ",".to_string()
}

fn default_decimal_sep() -> String {
    ".".to_string()
}

fn default_symbol_position() -> SymbolPosition {
    SymbolPosition::Before
}

/// Currency symbol position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    Before,
    After,
}

impl Default for SymbolPosition {
    fn default() -> Self {
        SymbolPosition::Before
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Feed pagination settings
    #[serde(default)]
    pub feed: FeedConfig,
    /// Record store settings
    #[serde(default)]
    pub store: StoreConfig,
    /// Forecast settings
    #[serde(default)]
    pub forecast: ForecastConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config =
            serde_yaml::from_str(content).map_err(|_| ConfigError::InvalidYaml)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.feed.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "feed.page_size".to_string(),
                reason: "Page size must be greater than 0".to_string(),
            });
        }

        if self.feed.fetch_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "feed.fetch_timeout_ms".to_string(),
                reason: "Fetch timeout must be greater than 0 when set".to_string(),
            });
        }

        if self.currency.decimal_places > 10 {
            return Err(ConfigError::InvalidValue {
                field: "currency.decimal_places".to_string(),
                reason: "Decimal places must be between 0 and 10".to_string(),
            });
        }

        if self.currency.decimal_separator.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "currency.decimal_separator".to_string(),
                reason: "Decimal separator must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("templates/default_config.yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.feed.page_size, 20);
        assert_eq!(config.feed.fetch_timeout_ms, None);
        assert!(config.forecast.enabled);
        assert_eq!(config.currency.decimal_places, 2);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config = Config::from_yaml("feed:\n  page_size: 5\n").unwrap();
        assert_eq!(config.feed.page_size, 5);
        assert_eq!(config.feed.max_scroll_events, 100);
        assert_eq!(config.currency.symbol, "$");
    }

    #[test]
    fn test_generated_default_is_valid() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.feed.page_size, 20);
        assert_eq!(config.currency.symbol_position, SymbolPosition::Before);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = Config::from_yaml("feed:\n  page_size: 0\n").unwrap_err();
        match err {
            ConfigError::InvalidValue { field, .. } => assert_eq!(field, "feed.page_size"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = Config::from_yaml("feed:\n  fetch_timeout_ms: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("feed: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidYaml));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(PathBuf::from("/nonexistent/cashfeed.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_unreadable_path_keeps_io_cause() {
        // A directory exists but cannot be read as a file
        let err = Config::load(std::env::temp_dir()).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
        assert_eq!(err.code(), error::ConfigErrorCode::IoError);
        assert!(err.to_string().len() > "IO error: ".len());
    }
}
