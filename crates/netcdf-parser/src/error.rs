//! Error types for NetCDF profile parsing.

use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF parsing.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The file could not be opened or read by the NetCDF library
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// A mandatory variable was not found by any resolution strategy
    #[error("Missing required variable: {0}")]
    MissingVariable(&'static str),

    /// A mandatory coordinate variable holds no finite, non-fill value
    #[error("No valid value in required variable '{0}'")]
    NoFiniteValue(String),
}
