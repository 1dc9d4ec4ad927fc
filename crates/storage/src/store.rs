//! Persistence seams for ingestion and queries.

use argo_common::{FloatId, Measurement, Profile, ProfileSummary, StoredProfile};
use async_trait::async_trait;

use crate::error::StorageResult;
use crate::query::ProfileQuery;

/// Outcome of inserting a profile keyed by `source_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileInsert {
    /// A new row was written with this id.
    Inserted(i64),
    /// A row with the same `source_file` already exists.
    Existing(i64),
}

/// Source of isolated, all-or-nothing write transactions.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    type Transaction: ProfileTransaction;

    async fn begin(&self) -> StorageResult<Self::Transaction>;
}

/// One open write transaction.
///
/// Nothing written through it is visible to other transactions until
/// [`commit`](ProfileTransaction::commit). Dropping it without committing
/// discards every write.
#[async_trait]
pub trait ProfileTransaction: Send {
    /// Insert the float if absent; an existing row is not an error.
    async fn upsert_float(&mut self, float_id: &FloatId) -> StorageResult<()>;

    /// Insert the profile unless its `source_file` is already present.
    async fn insert_profile(&mut self, profile: &Profile) -> StorageResult<ProfileInsert>;

    /// Append measurements in order, numbering them from `first_level`.
    async fn insert_measurements(
        &mut self,
        profile_id: i64,
        first_level: usize,
        rows: &[Measurement],
    ) -> StorageResult<()>;

    async fn commit(self) -> StorageResult<()>;

    async fn rollback(self) -> StorageResult<()>;
}

/// Read access for the query surface.
#[async_trait]
pub trait ProfileReader: Send + Sync {
    async fn list_profiles(&self, query: &ProfileQuery) -> StorageResult<Vec<ProfileSummary>>;

    /// A profile with its measurements in stored level order.
    async fn get_profile(&self, id: i64) -> StorageResult<Option<StoredProfile>>;

    /// Verify the backend is reachable.
    async fn ping(&self) -> StorageResult<()> {
        Ok(())
    }
}
