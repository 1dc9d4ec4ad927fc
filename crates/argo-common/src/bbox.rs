//! Geographic filter types for profile queries.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used for great-circle distances (km).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A geographic bounding box in degrees.
///
/// `x` is longitude and `y` is latitude. Edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Parse a query string of the form "minLon,minLat,maxLon,maxLat".
    pub fn from_query_string(s: &str) -> Result<Self, BboxParseError> {
        let parts = parse_numbers(s, 4).map_err(|bad| match bad {
            Some(part) => BboxParseError::InvalidNumber(part),
            None => BboxParseError::InvalidFormat(s.to_string()),
        })?;

        Ok(Self::new(parts[0], parts[1], parts[2], parts[3]))
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// A longitude/latitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Great-circle distance in kilometres (spherical law of cosines).
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlon = (other.lon - self.lon).to_radians();
        let cos_angle = lat1.cos() * lat2.cos() * dlon.cos() + lat1.sin() * lat2.sin();
        EARTH_RADIUS_KM * cos_angle.clamp(-1.0, 1.0).acos()
    }
}

/// "Within `radius_km` of `center`" filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusFilter {
    pub center: GeoPoint,
    pub radius_km: f64,
}

impl RadiusFilter {
    /// Parse a query string of the form "lon,lat,radiusKm".
    pub fn from_query_string(s: &str) -> Result<Self, BboxParseError> {
        let parts = parse_numbers(s, 3).map_err(|bad| match bad {
            Some(part) => BboxParseError::InvalidNumber(part),
            None => BboxParseError::InvalidRadius(s.to_string()),
        })?;

        Ok(Self {
            center: GeoPoint::new(parts[0], parts[1]),
            radius_km: parts[2],
        })
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.center.distance_km(point) <= self.radius_km
    }
}

/// Split on commas and parse exactly `expected` finite numbers.
///
/// The error carries the offending part, or `None` for a wrong count.
fn parse_numbers(s: &str, expected: usize) -> Result<Vec<f64>, Option<String>> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != expected {
        return Err(None);
    }

    parts
        .into_iter()
        .map(|part| match part.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(Some(part.to_string())),
        })
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid BBOX format: {0}. Expected 'minLon,minLat,maxLon,maxLat'")]
    InvalidFormat(String),

    #[error("Invalid radius format: {0}. Expected 'lon,lat,radiusKm'")]
    InvalidRadius(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),
}
