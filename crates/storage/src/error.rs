//! Error types for the storage crate.

use thiserror::Error;

/// Errors raised by persistence backends.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Backend failure not originating from sqlx (e.g. in-memory stores).
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
