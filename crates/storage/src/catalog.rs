//! Profile catalog using PostgreSQL.

use std::collections::BTreeMap;

use argo_common::{FloatId, Measurement, Profile, ProfileSummary, StoredProfile};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, Postgres};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, QueryBuilder, Transaction};
use tracing::{debug, info};

use crate::error::StorageResult;
use crate::query::ProfileQuery;
use crate::store::{ProfileInsert, ProfileReader, ProfileStore, ProfileTransaction};

/// Bind parameters per measurement row in a batched insert.
const MEASUREMENT_COLUMNS: usize = 6;

/// Largest measurement batch that fits PostgreSQL's 65535 bind-parameter limit.
pub const MAX_MEASUREMENT_BATCH: usize = u16::MAX as usize / MEASUREMENT_COLUMNS;

/// Database connection pool and catalog operations.
///
/// The pool is owned by whoever constructs the catalog; call
/// [`Catalog::close`] at shutdown.
#[derive(Clone)]
pub struct Catalog {
    pool: PgPool,
}

impl Catalog {
    /// Create a new catalog connection from database URL.
    pub async fn connect(database_url: &str, max_connections: u32) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        info!(max_connections = max_connections, "Connected to profile catalog");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create tables and indexes if they do not exist.
    pub async fn migrate(&self) -> StorageResult<()> {
        for statement in SCHEMA_SQL.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed).execute(&self.pool).await?;
            }
        }
        debug!("Schema migration complete");
        Ok(())
    }

    /// Close all pooled connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ProfileStore for Catalog {
    type Transaction = PgProfileTransaction;

    async fn begin(&self) -> StorageResult<PgProfileTransaction> {
        let tx = self.pool.begin().await?;
        Ok(PgProfileTransaction { tx })
    }
}

/// A PostgreSQL transaction; rolled back on drop unless committed.
pub struct PgProfileTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ProfileTransaction for PgProfileTransaction {
    async fn upsert_float(&mut self, float_id: &FloatId) -> StorageResult<()> {
        sqlx::query("INSERT INTO floats (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(float_id.as_str())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn insert_profile(&mut self, profile: &Profile) -> StorageResult<ProfileInsert> {
        let inserted = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO profiles (float_id, profile_time, latitude, longitude, source_file)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (source_file) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(profile.float_id.as_ref().map(FloatId::as_str))
        .bind(profile.profile_time)
        .bind(profile.latitude)
        .bind(profile.longitude)
        .bind(&profile.source_file)
        .fetch_optional(&mut *self.tx)
        .await?;

        if let Some(id) = inserted {
            return Ok(ProfileInsert::Inserted(id));
        }

        let existing =
            sqlx::query_scalar::<_, i64>("SELECT id FROM profiles WHERE source_file = $1")
                .bind(&profile.source_file)
                .fetch_one(&mut *self.tx)
                .await?;

        Ok(ProfileInsert::Existing(existing))
    }

    async fn insert_measurements(
        &mut self,
        profile_id: i64,
        first_level: usize,
        rows: &[Measurement],
    ) -> StorageResult<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO measurements \
             (profile_id, level_index, depth, temperature, salinity, extras) ",
        );

        qb.push_values(rows.iter().enumerate(), |mut row, (offset, m)| {
            row.push_bind(profile_id)
                .push_bind((first_level + offset) as i32)
                .push_bind(m.depth)
                .push_bind(m.temperature)
                .push_bind(m.salinity)
                .push_bind(Json(m.extras.clone()));
        });

        qb.build().execute(&mut *self.tx).await?;
        Ok(())
    }

    async fn commit(self) -> StorageResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> StorageResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileReader for Catalog {
    async fn list_profiles(&self, query: &ProfileQuery) -> StorageResult<Vec<ProfileSummary>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT id, float_id, profile_time, latitude, longitude, source_file \
             FROM profiles WHERE TRUE",
        );

        if let Some(float_id) = &query.float_id {
            qb.push(" AND float_id = ").push_bind(float_id.as_str().to_string());
        }
        if let Some(start) = query.time.start {
            qb.push(" AND profile_time >= ").push_bind(start);
        }
        if let Some(end) = query.time.end {
            qb.push(" AND profile_time <= ").push_bind(end);
        }
        if let Some(bbox) = &query.bbox {
            qb.push(" AND latitude BETWEEN ")
                .push_bind(bbox.min_y)
                .push(" AND ")
                .push_bind(bbox.max_y)
                .push(" AND longitude BETWEEN ")
                .push_bind(bbox.min_x)
                .push(" AND ")
                .push_bind(bbox.max_x);
        }
        if let Some(near) = &query.near {
            // Spherical law of cosines; the clamp keeps acos defined for identical points.
            qb.push(" AND (6371.0 * acos(LEAST(1.0, GREATEST(-1.0, cos(radians(")
                .push_bind(near.center.lat)
                .push(")) * cos(radians(latitude)) * cos(radians(longitude) - radians(")
                .push_bind(near.center.lon)
                .push(")) + sin(radians(")
                .push_bind(near.center.lat)
                .push(")) * sin(radians(latitude)))))) <= ")
                .push_bind(near.radius_km);
        }

        qb.push(" ORDER BY profile_time DESC NULLS LAST, id ASC LIMIT ")
            .push_bind(query.limit)
            .push(" OFFSET ")
            .push_bind(query.offset);

        let rows = qb
            .build_query_as::<ProfileRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ProfileSummary::from).collect())
    }

    async fn get_profile(&self, id: i64) -> StorageResult<Option<StoredProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT id, float_id, profile_time, latitude, longitude, source_file \
             FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let measurements = sqlx::query_as::<_, MeasurementRow>(
            "SELECT depth, temperature, salinity, extras FROM measurements \
             WHERE profile_id = $1 ORDER BY level_index ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(StoredProfile {
            profile: row.into(),
            measurements: measurements.into_iter().map(Measurement::from).collect(),
        }))
    }

    async fn ping(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Internal row type for profile queries.
#[derive(FromRow)]
struct ProfileRow {
    id: i64,
    float_id: Option<String>,
    profile_time: Option<DateTime<Utc>>,
    latitude: f64,
    longitude: f64,
    source_file: String,
}

impl From<ProfileRow> for ProfileSummary {
    fn from(row: ProfileRow) -> Self {
        ProfileSummary {
            id: row.id,
            float_id: row.float_id.map(FloatId::new),
            profile_time: row.profile_time,
            latitude: row.latitude,
            longitude: row.longitude,
            source_file: row.source_file,
        }
    }
}

/// Internal row type for measurement queries.
#[derive(FromRow)]
struct MeasurementRow {
    depth: Option<f64>,
    temperature: Option<f64>,
    salinity: Option<f64>,
    extras: Json<BTreeMap<String, f64>>,
}

impl From<MeasurementRow> for Measurement {
    fn from(row: MeasurementRow) -> Self {
        Measurement {
            depth: row.depth,
            temperature: row.temperature,
            salinity: row.salinity,
            extras: row.extras.0,
        }
    }
}

/// Database schema SQL.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS floats (
    id TEXT PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS profiles (
    id BIGSERIAL PRIMARY KEY,
    float_id TEXT REFERENCES floats(id),
    profile_time TIMESTAMPTZ,
    latitude DOUBLE PRECISION NOT NULL,
    longitude DOUBLE PRECISION NOT NULL,
    source_file TEXT NOT NULL UNIQUE,
    ingested_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_profiles_float_id ON profiles(float_id);
CREATE INDEX IF NOT EXISTS idx_profiles_time ON profiles(profile_time DESC);
CREATE INDEX IF NOT EXISTS idx_profiles_lat_lon ON profiles(latitude, longitude);

CREATE TABLE IF NOT EXISTS measurements (
    id BIGSERIAL PRIMARY KEY,
    profile_id BIGINT NOT NULL REFERENCES profiles(id),
    level_index INTEGER NOT NULL,
    depth DOUBLE PRECISION,
    temperature DOUBLE PRECISION,
    salinity DOUBLE PRECISION,
    extras JSONB NOT NULL DEFAULT '{}'
);

CREATE INDEX IF NOT EXISTS idx_measurements_profile ON measurements(profile_id, level_index)
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_split_cleanly() {
        let statements: Vec<&str> = SCHEMA_SQL
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        assert_eq!(statements.len(), 7);
        assert!(statements.iter().all(|s| s.starts_with("CREATE")));
    }

    #[test]
    fn test_max_measurement_batch_fits_bind_limit() {
        assert_eq!(MAX_MEASUREMENT_BATCH, 10922);
        assert!(MAX_MEASUREMENT_BATCH * MEASUREMENT_COLUMNS <= 65535);
        assert!((MAX_MEASUREMENT_BATCH + 1) * MEASUREMENT_COLUMNS > 65535);
    }

    #[test]
    fn test_measurement_row_conversion() {
        let mut extras = BTreeMap::new();
        extras.insert("doxy".to_string(), 201.5);
        let row = MeasurementRow {
            depth: Some(10.0),
            temperature: None,
            salinity: Some(35.0),
            extras: Json(extras.clone()),
        };
        let m = Measurement::from(row);
        assert_eq!(m.depth, Some(10.0));
        assert_eq!(m.temperature, None);
        assert_eq!(m.extras, extras);
    }
}
