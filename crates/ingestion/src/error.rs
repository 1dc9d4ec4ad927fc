//! Error types for the ingestion crate.

use std::fmt;
use std::path::PathBuf;

use netcdf_parser::NetCdfError;
use storage::StorageError;
use thiserror::Error;

/// Transaction step at which a persistence failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Begin,
    FloatUpsert,
    ProfileInsert,
    MeasurementInsert,
    Commit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Begin => "begin",
            Stage::FloatUpsert => "float upsert",
            Stage::ProfileInsert => "profile insert",
            Stage::MeasurementInsert => "measurement insert",
            Stage::Commit => "commit",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during ingestion.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Failed to read directory {}: {source}", path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse profile file: {0}")]
    Parse(#[from] NetCdfError),

    #[error("Storage failure during {stage}: {source}")]
    Storage {
        stage: Stage,
        #[source]
        source: StorageError,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl IngestionError {
    pub fn storage(stage: Stage, source: StorageError) -> Self {
        IngestionError::Storage { stage, source }
    }

    /// The transaction stage for persistence failures.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            IngestionError::Storage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;
