//! Argo profile ingestion library.
//!
//! Turns profile files into catalog rows, one all-or-nothing transaction
//! per file:
//!
//! - [`IngestionTransaction`]: float upsert, idempotent profile insert and
//!   chunked measurement writes against any [`storage::ProfileStore`]
//! - [`Ingester`]: per-file and per-directory driver that never lets one
//!   bad file abort a batch
//! - [`IngestConfig`]: environment-driven settings for the ingester binary

pub mod config;
pub mod error;
mod ingester;
mod transaction;

// Re-exports
pub use config::IngestConfig;
pub use error::{IngestionError, Result, Stage};
pub use ingester::{BatchReport, FileOutcome, IngestOptions, Ingester};
pub use transaction::{IngestionTransaction, TransactionOutcome};
