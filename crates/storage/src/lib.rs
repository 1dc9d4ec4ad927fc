//! Storage abstractions for the Argo profile services.
//!
//! Provides:
//! - The transactional write seam used by ingestion ([`ProfileStore`])
//! - The read seam used by the query API ([`ProfileReader`])
//! - A PostgreSQL implementation of both ([`Catalog`])

pub mod catalog;
pub mod error;
pub mod query;
pub mod store;

pub use catalog::{Catalog, PgProfileTransaction, MAX_MEASUREMENT_BATCH};
pub use error::{StorageError, StorageResult};
pub use query::ProfileQuery;
pub use store::{ProfileInsert, ProfileReader, ProfileStore, ProfileTransaction};
