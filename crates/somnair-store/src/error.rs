//! Error types for somnair-store.

use std::path::PathBuf;

use somnair_types::ValidationError;

/// Result type for somnair-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in somnair-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to create database directory.
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Observation values were rejected before touching the database.
    #[error("Invalid observation: {0}")]
    Validation(#[from] ValidationError),

    /// A stored timestamp could not be parsed.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// CSV export error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error came from the storage engine rather than the caller.
    pub fn is_storage(&self) -> bool {
        !matches!(self, Error::Validation(_))
    }
}
