//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/onboardiq/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/onboardiq/` (~/.config/onboardiq/)
//! - Data: `$XDG_DATA_HOME/onboardiq/` (~/.local/share/onboardiq/)
//! - State/Logs: `$XDG_STATE_HOME/onboardiq/` (~/.local/state/onboardiq/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Directory name used under each XDG base directory.
const APP_DIR: &str = "onboardiq";

/// `$var` if set, else `$HOME/<fallback>`.
fn xdg_dir(var: &str, fallback: &str) -> PathBuf {
    if let Some(dir) = std::env::var_os(var).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(fallback)
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Session identity defaults
    #[serde(default)]
    pub session: SessionConfig,

    /// Chat presentation settings
    #[serde(default)]
    pub chat: ChatConfig,

    /// Database location override
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Session configuration
#[derive(Debug, Deserialize)]
pub struct SessionConfig {
    /// User identifier used when none is passed on the command line
    #[serde(default = "default_user")]
    pub default_user: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_user: default_user(),
        }
    }
}

fn default_user() -> String {
    "demo_user".to_string()
}

/// Chat configuration
#[derive(Debug, Deserialize)]
pub struct ChatConfig {
    /// How long the assistant "types" before a reply appears
    #[serde(default = "default_typing_delay_ms")]
    pub typing_delay_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            typing_delay_ms: default_typing_delay_ms(),
        }
    }
}

fn default_typing_delay_ms() -> u64 {
    500
}

/// Database configuration
#[derive(Debug, Deserialize, Default)]
pub struct DatabaseConfig {
    /// Override path for the SQLite database file
    pub path: Option<PathBuf>,
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

        Ok(config)
    }

    /// Resolve the database path, honoring `[database] path` if set.
    pub fn resolved_database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(Self::database_path)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/onboardiq/config.toml` (~/.config/onboardiq/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_dir("XDG_CONFIG_HOME", ".config").join(APP_DIR).join("config.toml")
    }

    /// Returns the data directory path (for SQLite database)
    pub fn data_dir() -> PathBuf {
        xdg_dir("XDG_DATA_HOME", ".local/share").join(APP_DIR)
    }

    /// Returns the state directory path (for logs)
    pub fn state_dir() -> PathBuf {
        xdg_dir("XDG_STATE_HOME", ".local/state").join(APP_DIR)
    }

    /// Returns the default database file path
    ///
    /// `$XDG_DATA_HOME/onboardiq/onboardiq.db`
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("onboardiq.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/onboardiq/onboardiq.log`
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("onboardiq.log")
    }
}
