//! Error types for the salon-ops library.
//!
//! This module provides custom error types using `thiserror` for better error handling
//! and more specific error messages throughout the application.

use thiserror::Error;

/// Errors that can occur in the salon-ops application.
#[derive(Error, Debug)]
pub enum SalonOpsError {
    /// SQLite-backed store errors
    #[error("store error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool errors
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Generic tabular store failure (backend-specific message)
    #[error("store error: {0}")]
    Store(String),

    /// Table missing from the backing store
    #[error("table not found: {0}")]
    MissingTable(String),

    /// A cell range that does not fit the target table
    #[error("invalid cell range: {0}")]
    InvalidRange(String),

    /// File I/O errors
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid date format
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization/deserialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Binary serialization errors
    #[error("binary serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// CSV export errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Cache errors
    #[error("cache error: {0}")]
    Cache(String),

    /// General error with context
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Result with SalonOpsError
pub type Result<T> = std::result::Result<T, SalonOpsError>;

impl From<anyhow::Error> for SalonOpsError {
    fn from(err: anyhow::Error) -> Self {
        SalonOpsError::Other(err.to_string())
    }
}

impl From<sled::Error> for SalonOpsError {
    fn from(err: sled::Error) -> Self {
        SalonOpsError::Cache(err.to_string())
    }
}
