//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::storage::{PrefsBackend, StorageConfig};
use crate::sync::{SyncConfig, WireFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub watch: WatchSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Preference storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default)]
    pub backend: PrefsBackend,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("timelycare").to_string_lossy().to_string())
        .unwrap_or_else(|| "./timelycare_data".to_string())
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backend: PrefsBackend::default(),
        }
    }
}

impl StorageSettings {
    /// Runtime storage configuration for these settings
    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig::new(expand_home(&self.data_dir)).backend(self.backend)
    }
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

/// Watch-side configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSettings {
    /// Capacity of the in-process data layer channel
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Days of synthetic vitals history shown
    #[serde(default = "default_history_days")]
    pub history_days: u32,
}

fn default_channel_capacity() -> usize {
    64
}

fn default_history_days() -> u32 {
    7
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            history_days: default_history_days(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("timelycare").join("config.toml")),
            Some(PathBuf::from("/etc/timelycare/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a `TIMELYCARE_*` lookup. Unparseable values are
    /// ignored with a warning.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Storage overrides
        if let Some(data_dir) = lookup("TIMELYCARE_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }
        if let Some(backend) = lookup("TIMELYCARE_PREFS_BACKEND") {
            match backend.parse() {
                Ok(b) => self.storage.backend = b,
                Err(e) => tracing::warn!(error = %e, "Ignoring TIMELYCARE_PREFS_BACKEND"),
            }
        }

        // Sync overrides
        if let Some(enabled) = lookup("TIMELYCARE_SYNC_ENABLED") {
            match parse_bool(&enabled) {
                Some(b) => self.sync.enabled = b,
                None => tracing::warn!(value = %enabled, "Ignoring TIMELYCARE_SYNC_ENABLED"),
            }
        }
        if let Some(format) = lookup("TIMELYCARE_SYNC_FORMAT") {
            match format.parse::<WireFormat>() {
                Ok(f) => self.sync.format = f,
                Err(e) => tracing::warn!(error = %e, "Ignoring TIMELYCARE_SYNC_FORMAT"),
            }
        }

        // Logging overrides
        if let Some(level) = lookup("TIMELYCARE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("TIMELYCARE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# TimelyCare Configuration
#
# Environment variables override these settings:
# - TIMELYCARE_DATA_DIR
# - TIMELYCARE_PREFS_BACKEND
# - TIMELYCARE_SYNC_ENABLED
# - TIMELYCARE_SYNC_FORMAT
# - TIMELYCARE_LOG_LEVEL
# - TIMELYCARE_LOG_FORMAT

[storage]
# Directory for preference files
data_dir = "~/.local/share/timelycare"

# Preference backend: memory, json, or sqlite
backend = "json"

[sync]
# Push the medication list to the watch on every change
enabled = true

# Payload encoding: framed (default) or delimited (legacy watches)
format = "framed"

[watch]
# Capacity of the in-process phone/watch channel
channel_capacity = 64

# Days of vitals history to show
history_days = 7

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
