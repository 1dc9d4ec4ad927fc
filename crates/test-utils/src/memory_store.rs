//! In-memory implementation of the storage seams.
//!
//! Writes are staged per transaction and applied only on commit, so a
//! rolled back or dropped transaction leaves no trace. Failures can be
//! injected at any transaction step.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use argo_common::{FloatId, Measurement, Profile, ProfileSummary, StoredProfile};
use async_trait::async_trait;
use storage::{
    ProfileInsert, ProfileQuery, ProfileReader, ProfileStore, ProfileTransaction, StorageError,
    StorageResult,
};

/// Transaction step at which [`MemoryStore`] fails on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Begin,
    FloatUpsert,
    ProfileInsert,
    /// Fail the measurement insert call with this 0-based index.
    MeasurementInsert { call: usize },
    Commit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRecord {
    pub profile_id: i64,
    pub level_index: usize,
    pub measurement: Measurement,
}

#[derive(Debug, Default)]
struct Tables {
    floats: BTreeSet<String>,
    profiles: Vec<ProfileSummary>,
    measurements: Vec<MeasurementRecord>,
    next_profile_id: i64,
    fail_point: Option<FailPoint>,
    batch_sizes: Vec<usize>,
    commits: usize,
    rollbacks: usize,
}

impl Tables {
    fn find_source(&self, source_file: &str) -> Option<i64> {
        self.profiles
            .iter()
            .find(|p| p.source_file == source_file)
            .map(|p| p.id)
    }
}

/// Shared in-memory store. Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent transaction fail at `point`.
    pub fn fail_at(&self, point: FailPoint) {
        self.lock().fail_point = Some(point);
    }

    pub fn clear_failures(&self) {
        self.lock().fail_point = None;
    }

    /// Committed float ids.
    pub fn floats(&self) -> Vec<String> {
        self.lock().floats.iter().cloned().collect()
    }

    /// Committed profiles in insertion order.
    pub fn profiles(&self) -> Vec<ProfileSummary> {
        self.lock().profiles.clone()
    }

    /// Committed measurements in insertion order.
    pub fn measurements(&self) -> Vec<MeasurementRecord> {
        self.lock().measurements.clone()
    }

    /// Row counts of every measurement insert call, committed or not.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.lock().batch_sizes.clone()
    }

    pub fn commits(&self) -> usize {
        self.lock().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.lock().rollbacks
    }

    /// Insert an already committed profile directly, bypassing transactions.
    pub fn seed(&self, profile: &Profile) -> i64 {
        let mut tables = self.lock();
        tables.next_profile_id += 1;
        let id = tables.next_profile_id;
        if let Some(float_id) = &profile.float_id {
            tables.floats.insert(float_id.as_str().to_string());
        }
        tables.profiles.push(summary(id, profile));
        for (level_index, m) in profile.measurements.iter().enumerate() {
            tables.measurements.push(MeasurementRecord {
                profile_id: id,
                level_index,
                measurement: m.clone(),
            });
        }
        id
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn summary(id: i64, profile: &Profile) -> ProfileSummary {
    ProfileSummary {
        id,
        float_id: profile.float_id.clone(),
        profile_time: profile.profile_time,
        latitude: profile.latitude,
        longitude: profile.longitude,
        source_file: profile.source_file.clone(),
    }
}

fn injected(point: FailPoint) -> StorageError {
    StorageError::Backend(format!("injected failure at {point:?}"))
}

#[async_trait]
impl ProfileStore for MemoryStore {
    type Transaction = MemoryTransaction;

    async fn begin(&self) -> StorageResult<MemoryTransaction> {
        let fail_point = self.lock().fail_point;
        if fail_point == Some(FailPoint::Begin) {
            return Err(injected(FailPoint::Begin));
        }
        Ok(MemoryTransaction {
            store: self.clone(),
            fail_point,
            floats: Vec::new(),
            profile: None,
            measurements: Vec::new(),
            measurement_calls: 0,
        })
    }
}

/// Staged writes of one transaction.
pub struct MemoryTransaction {
    store: MemoryStore,
    fail_point: Option<FailPoint>,
    floats: Vec<FloatId>,
    profile: Option<ProfileSummary>,
    measurements: Vec<MeasurementRecord>,
    measurement_calls: usize,
}

impl MemoryTransaction {
    fn check(&self, point: FailPoint) -> StorageResult<()> {
        if self.fail_point == Some(point) {
            Err(injected(point))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ProfileTransaction for MemoryTransaction {
    async fn upsert_float(&mut self, float_id: &FloatId) -> StorageResult<()> {
        self.check(FailPoint::FloatUpsert)?;
        if !self.floats.contains(float_id) {
            self.floats.push(float_id.clone());
        }
        Ok(())
    }

    async fn insert_profile(&mut self, profile: &Profile) -> StorageResult<ProfileInsert> {
        self.check(FailPoint::ProfileInsert)?;

        if let Some(staged) = &self.profile {
            if staged.source_file == profile.source_file {
                return Ok(ProfileInsert::Existing(staged.id));
            }
            return Err(StorageError::Backend(
                "memory transactions hold a single profile".to_string(),
            ));
        }

        let mut tables = self.store.lock();
        if let Some(id) = tables.find_source(&profile.source_file) {
            return Ok(ProfileInsert::Existing(id));
        }
        tables.next_profile_id += 1;
        let id = tables.next_profile_id;
        drop(tables);

        self.profile = Some(summary(id, profile));
        Ok(ProfileInsert::Inserted(id))
    }

    async fn insert_measurements(
        &mut self,
        profile_id: i64,
        first_level: usize,
        rows: &[Measurement],
    ) -> StorageResult<()> {
        let call = self.measurement_calls;
        self.measurement_calls += 1;
        self.store.lock().batch_sizes.push(rows.len());
        self.check(FailPoint::MeasurementInsert { call })?;

        if self.profile.as_ref().map(|p| p.id) != Some(profile_id) {
            return Err(StorageError::Backend(format!(
                "foreign key violation: profile {profile_id} does not exist"
            )));
        }

        self.measurements
            .extend(rows.iter().enumerate().map(|(offset, m)| MeasurementRecord {
                profile_id,
                level_index: first_level + offset,
                measurement: m.clone(),
            }));
        Ok(())
    }

    async fn commit(self) -> StorageResult<()> {
        self.check(FailPoint::Commit)?;

        let mut tables = self.store.lock();
        if let Some(profile) = &self.profile {
            if tables.find_source(&profile.source_file).is_some() {
                return Err(StorageError::Backend(format!(
                    "unique violation on source_file '{}'",
                    profile.source_file
                )));
            }
        }

        for float_id in self.floats {
            tables.floats.insert(float_id.as_str().to_string());
        }
        if let Some(profile) = self.profile {
            tables.profiles.push(profile);
        }
        tables.measurements.extend(self.measurements);
        tables.commits += 1;
        Ok(())
    }

    async fn rollback(self) -> StorageResult<()> {
        self.store.lock().rollbacks += 1;
        Ok(())
    }
}

#[async_trait]
impl ProfileReader for MemoryStore {
    async fn list_profiles(&self, query: &ProfileQuery) -> StorageResult<Vec<ProfileSummary>> {
        let mut matched: Vec<ProfileSummary> = self
            .lock()
            .profiles
            .iter()
            .filter(|p| query.matches(p))
            .cloned()
            .collect();

        // profile_time descending with nulls last, then id
        matched.sort_by(|a, b| {
            b.profile_time
                .is_some()
                .cmp(&a.profile_time.is_some())
                .then_with(|| b.profile_time.cmp(&a.profile_time))
                .then_with(|| a.id.cmp(&b.id))
        });

        let offset = usize::try_from(query.offset.max(0)).unwrap_or(0);
        let limit = usize::try_from(query.limit.max(0)).unwrap_or(0);
        Ok(matched.into_iter().skip(offset).take(limit).collect())
    }

    async fn get_profile(&self, id: i64) -> StorageResult<Option<StoredProfile>> {
        let tables = self.lock();
        let Some(profile) = tables.profiles.iter().find(|p| p.id == id).cloned() else {
            return Ok(None);
        };

        let mut rows: Vec<&MeasurementRecord> = tables
            .measurements
            .iter()
            .filter(|m| m.profile_id == id)
            .collect();
        rows.sort_by_key(|m| m.level_index);

        Ok(Some(StoredProfile {
            profile,
            measurements: rows.into_iter().map(|m| m.measurement.clone()).collect(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_profile;

    #[tokio::test]
    async fn test_uncommitted_writes_are_invisible() {
        let store = MemoryStore::new();
        let profile = sample_profile("a.nc", Some("42"), 2);

        let mut tx = store.begin().await.unwrap();
        tx.upsert_float(&FloatId::new("42")).await.unwrap();
        let id = match tx.insert_profile(&profile).await.unwrap() {
            ProfileInsert::Inserted(id) => id,
            other => panic!("unexpected {other:?}"),
        };
        tx.insert_measurements(id, 0, &profile.measurements).await.unwrap();

        assert!(store.profiles().is_empty());
        tx.rollback().await.unwrap();

        assert!(store.profiles().is_empty());
        assert!(store.floats().is_empty());
        assert!(store.measurements().is_empty());
        assert_eq!(store.rollbacks(), 1);
    }

    #[tokio::test]
    async fn test_existing_source_file_reported() {
        let store = MemoryStore::new();
        let profile = sample_profile("a.nc", None, 1);
        let seeded = store.seed(&profile);

        let mut tx = store.begin().await.unwrap();
        assert_eq!(
            tx.insert_profile(&profile).await.unwrap(),
            ProfileInsert::Existing(seeded)
        );
    }

    #[tokio::test]
    async fn test_list_orders_nulls_last() {
        let store = MemoryStore::new();
        let mut untimed = sample_profile("untimed.nc", None, 0);
        untimed.profile_time = None;
        let untimed_id = store.seed(&untimed);
        let timed_id = store.seed(&sample_profile("timed.nc", None, 0));

        let listed = store.list_profiles(&ProfileQuery::default()).await.unwrap();
        let ids: Vec<i64> = listed.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![timed_id, untimed_id]);
    }
}
