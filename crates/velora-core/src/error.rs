//! Error types for velora-core

use thiserror::Error;

/// Result type alias using velora-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in velora-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Article not found
    #[error("Article not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Asset host / object storage error
    #[error("Storage error: {0}")]
    Storage(String),
}
