//! Common types and utilities shared across the Argo profile services.

pub mod bbox;
pub mod error;
pub mod profile;
pub mod time;

pub use bbox::{BoundingBox, GeoPoint, RadiusFilter};
pub use error::{ArgoError, ArgoResult};
pub use profile::{FloatId, Measurement, Profile, ProfileSummary, StoredProfile};
pub use time::{parse_timestamp, TimeRange};
