//! Float, profile and measurement records.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque platform identifier of an autonomous float.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FloatId(String);

impl FloatId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FloatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FloatId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One vertical level of a profile.
///
/// `extras` holds auxiliary channels keyed by lower-cased variable name;
/// a key is present only when a value was observed at this level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub depth: Option<f64>,
    pub temperature: Option<f64>,
    pub salinity: Option<f64>,
    #[serde(default)]
    pub extras: BTreeMap<String, f64>,
}

impl Measurement {
    /// True when no primary value and no extras entry was observed.
    pub fn is_empty(&self) -> bool {
        self.depth.is_none()
            && self.temperature.is_none()
            && self.salinity.is_none()
            && self.extras.is_empty()
    }

    /// Extras flattened to top-level keys; the primary columns win on collision.
    pub fn flattened(&self) -> Map<String, Value> {
        let mut map: Map<String, Value> = self
            .extras
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(*v)))
            .collect();

        map.insert("depth".to_string(), option_to_json(self.depth));
        map.insert("temperature".to_string(), option_to_json(self.temperature));
        map.insert("salinity".to_string(), option_to_json(self.salinity));
        map
    }
}

fn option_to_json(v: Option<f64>) -> Value {
    v.map(Value::from).unwrap_or(Value::Null)
}

/// An assembled profile, ready to be ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub float_id: Option<FloatId>,
    pub profile_time: Option<DateTime<Utc>>,
    pub latitude: f64,
    pub longitude: f64,
    /// Originating file path; the natural ingestion key.
    pub source_file: String,
    /// Levels in file order.
    pub measurements: Vec<Measurement>,
}

/// A persisted profile row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: i64,
    pub float_id: Option<FloatId>,
    pub profile_time: Option<DateTime<Utc>>,
    pub latitude: f64,
    pub longitude: f64,
    pub source_file: String,
}

/// A persisted profile with its measurements in stored level order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProfile {
    pub profile: ProfileSummary,
    pub measurements: Vec<Measurement>,
}
