//! Per-file write transaction.
//!
//! START -> FLOAT-UPSERTED -> PROFILE-RESOLVED -> {COMMITTED | SKIPPED | FAILED}.
//! A failure at any step rolls back everything written so far, including
//! the float upsert.

use argo_common::Profile;
use storage::{ProfileInsert, ProfileStore, ProfileTransaction};
use tracing::{debug, warn};

use crate::error::{IngestionError, Result, Stage};

/// Terminal state of a transaction that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionOutcome {
    Committed { profile_id: i64, measurements: usize },
    /// The `source_file` was already present; nothing was written.
    Skipped { profile_id: i64 },
}

/// Writes one assembled profile through a [`ProfileStore`].
pub struct IngestionTransaction<'a, S> {
    store: &'a S,
    chunk_size: usize,
}

impl<'a, S: ProfileStore> IngestionTransaction<'a, S> {
    pub fn new(store: &'a S, chunk_size: usize) -> Self {
        Self {
            store,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Run the transaction to completion.
    ///
    /// On error the transaction has been rolled back and the returned error
    /// names the stage that failed.
    pub async fn run(&self, profile: &Profile) -> Result<TransactionOutcome> {
        let mut tx = self
            .store
            .begin()
            .await
            .map_err(|e| IngestionError::storage(Stage::Begin, e))?;

        match self.write(&mut tx, profile).await {
            Ok(TransactionOutcome::Skipped { profile_id }) => {
                // Deliberate rollback: nothing new may be kept for a duplicate.
                if let Err(e) = tx.rollback().await {
                    warn!(error = %e, "Rollback after duplicate profile failed");
                }
                Ok(TransactionOutcome::Skipped { profile_id })
            }
            Ok(committed) => {
                tx.commit()
                    .await
                    .map_err(|e| IngestionError::storage(Stage::Commit, e))?;
                Ok(committed)
            }
            Err(err) => {
                if let Err(e) = tx.rollback().await {
                    warn!(error = %e, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    async fn write(&self, tx: &mut S::Transaction, profile: &Profile) -> Result<TransactionOutcome> {
        if let Some(float_id) = &profile.float_id {
            tx.upsert_float(float_id)
                .await
                .map_err(|e| IngestionError::storage(Stage::FloatUpsert, e))?;
        }

        let profile_id = match tx
            .insert_profile(profile)
            .await
            .map_err(|e| IngestionError::storage(Stage::ProfileInsert, e))?
        {
            ProfileInsert::Inserted(id) => id,
            ProfileInsert::Existing(id) => {
                return Ok(TransactionOutcome::Skipped { profile_id: id });
            }
        };

        for (chunk_index, chunk) in profile.measurements.chunks(self.chunk_size).enumerate() {
            let first_level = chunk_index * self.chunk_size;
            debug!(
                profile_id = profile_id,
                first_level = first_level,
                rows = chunk.len(),
                "Writing measurement chunk"
            );
            tx.insert_measurements(profile_id, first_level, chunk)
                .await
                .map_err(|e| IngestionError::storage(Stage::MeasurementInsert, e))?;
        }

        Ok(TransactionOutcome::Committed {
            profile_id,
            measurements: profile.measurements.len(),
        })
    }
}
