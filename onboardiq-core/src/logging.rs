//! Logging setup.
//!
//! All binaries log to a daily-rotated file under the XDG state directory,
//! never to stdout: the TUI owns the terminal and `onboardiq-chat` output is
//! meant to be piped.

use crate::config::{Config, LoggingConfig};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// File name prefix for the rolling log.
pub const LOG_FILE_NAME: &str = "onboardiq.log";

/// Keeps the non-blocking writer alive; pending lines are flushed on drop.
pub struct LoggingGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Install the global subscriber, logging to `$XDG_STATE_HOME/onboardiq/`.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard> {
    init_in(&Config::state_dir(), config)
}

/// Install the global subscriber, logging into `dir`.
///
/// Fails if a global subscriber is already set.
pub fn init_in(dir: &Path, config: &LoggingConfig) -> Result<LoggingGuard> {
    std::fs::create_dir_all(dir)?;

    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(level_filter(&config.level))
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("failed to install logger: {}", e)))?;

    tracing::debug!(dir = %dir.display(), level = %config.level, "Logging initialized");

    Ok(LoggingGuard { _guard: guard })
}

/// `RUST_LOG` wins over the configured level; garbage falls back to `info`.
fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Route logs to the test harness writer. Safe to call repeatedly.
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Base path of the current log file (the appender adds a date suffix).
pub fn log_file_path() -> PathBuf {
    Config::log_path()
}
