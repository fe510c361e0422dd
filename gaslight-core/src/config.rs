//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/gaslight/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/gaslight/` (~/.config/gaslight/)
//! - Data: `$XDG_DATA_HOME/gaslight/` (~/.local/share/gaslight/)
//! - State/Logs: `$XDG_STATE_HOME/gaslight/` (~/.local/state/gaslight/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Category to base URL mapping used when replaying
    #[serde(default)]
    pub endpoints: EndpointConfig,

    /// Delivery settings
    #[serde(default)]
    pub relay: RelayConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default GraphQL backend
pub const DEFAULT_GRAPH_ENDPOINT: &str = "https://pub.highlight.io";

/// Default OTLP backend
pub const DEFAULT_OTLP_ENDPOINT: &str = "https://otel.highlight.io";

/// Mapping from destination category to base URL
///
/// ```toml
/// [endpoints]
/// gql = "https://pub.highlight.io"
/// otel = "https://otel.highlight.io"
/// ```
///
/// Categories listed in the file replace the defaults one by one; the
/// built-in `gql` and `otel` entries stay unless overridden.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, String>")]
pub struct EndpointConfig {
    bases: BTreeMap<String, String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        let mut bases = BTreeMap::new();
        bases.insert("gql".to_string(), DEFAULT_GRAPH_ENDPOINT.to_string());
        bases.insert("otel".to_string(), DEFAULT_OTLP_ENDPOINT.to_string());
        Self { bases }
    }
}

impl From<BTreeMap<String, String>> for EndpointConfig {
    fn from(overrides: BTreeMap<String, String>) -> Self {
        let mut config = Self::default();
        config.bases.extend(overrides);
        config
    }
}

impl EndpointConfig {
    /// An empty mapping, with no default categories
    pub fn empty() -> Self {
        Self {
            bases: BTreeMap::new(),
        }
    }

    /// Set (or replace) the base URL for a category
    pub fn set(&mut self, category: impl Into<String>, base_url: impl Into<String>) {
        self.bases.insert(category.into(), base_url.into());
    }

    /// Builder-style variant of [`EndpointConfig::set`]
    pub fn with(mut self, category: impl Into<String>, base_url: impl Into<String>) -> Self {
        self.set(category, base_url);
        self
    }

    /// Base URL configured for a category
    pub fn get(&self, category: &str) -> Option<&str> {
        self.bases.get(category).map(String::as_str)
    }

    /// Iterate over `(category, base_url)` pairs in category order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bases.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        for (category, base) in &self.bases {
            if category.is_empty() || category.contains(':') {
                return Err(Error::Config(format!(
                    "endpoint category {:?} must be non-empty and must not contain ':'",
                    category
                )));
            }
            if base.trim().is_empty() {
                return Err(Error::Config(format!(
                    "endpoints.{} must not be empty",
                    category
                )));
            }
        }
        Ok(())
    }
}

/// Delivery settings for replay passes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayConfig {
    /// HTTP request timeout in seconds
    ///
    /// Unset means no timeout: a hung delivery blocks the pass.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
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

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.endpoints.validate()?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/gaslight/config.toml` (~/.config/gaslight/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("gaslight").join("config.toml")
    }

    /// Returns the data directory path (for the SQLite queue)
    ///
    /// `$XDG_DATA_HOME/gaslight/` (~/.local/share/gaslight/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("gaslight")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/gaslight/` (~/.local/state/gaslight/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("gaslight")
    }

    /// Returns the queue database file path
    ///
    /// `$XDG_DATA_HOME/gaslight/gaslight.db` (~/.local/share/gaslight/gaslight.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("gaslight.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/gaslight/gaslight.log` (~/.local/state/gaslight/gaslight.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("gaslight.log")
    }
}
