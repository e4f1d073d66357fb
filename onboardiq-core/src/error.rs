//! Error types for onboardiq-core

use thiserror::Error;

/// Main error type for the onboardiq-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid milestone catalog
    #[error("catalog error: {0}")]
    Catalog(String),
}

/// Result type alias for onboardiq-core
pub type Result<T> = std::result::Result<T, Error>;
