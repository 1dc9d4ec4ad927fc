//! Profile listing filters.

use argo_common::{BoundingBox, FloatId, GeoPoint, ProfileSummary, RadiusFilter, TimeRange};

pub const DEFAULT_LIMIT: i64 = 5000;

/// Filters for listing profiles. All filters are AND-combined.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileQuery {
    pub float_id: Option<FloatId>,
    /// Inclusive bounds on `profile_time`.
    pub time: TimeRange,
    pub bbox: Option<BoundingBox>,
    pub near: Option<RadiusFilter>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ProfileQuery {
    fn default() -> Self {
        Self {
            float_id: None,
            time: TimeRange::default(),
            bbox: None,
            near: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl ProfileQuery {
    /// In-process evaluation of the filters, mirroring the SQL predicate.
    pub fn matches(&self, profile: &ProfileSummary) -> bool {
        if let Some(float_id) = &self.float_id {
            if profile.float_id.as_ref() != Some(float_id) {
                return false;
            }
        }

        if !self.time.contains(profile.profile_time.as_ref()) {
            return false;
        }

        if let Some(bbox) = &self.bbox {
            if !bbox.contains_point(profile.longitude, profile.latitude) {
                return false;
            }
        }

        if let Some(near) = &self.near {
            if !near.contains(&GeoPoint::new(profile.longitude, profile.latitude)) {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn summary(float_id: Option<&str>, lon: f64, lat: f64) -> ProfileSummary {
        ProfileSummary {
            id: 1,
            float_id: float_id.map(FloatId::from),
            profile_time: Some(Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap()),
            latitude: lat,
            longitude: lon,
            source_file: "a.nc".to_string(),
        }
    }

    #[test]
    fn test_default_matches_everything() {
        let q = ProfileQuery::default();
        assert_eq!(q.limit, DEFAULT_LIMIT);
        assert!(q.matches(&summary(None, 0.0, 0.0)));
    }

    #[test]
    fn test_float_filter() {
        let q = ProfileQuery {
            float_id: Some(FloatId::new("42")),
            ..Default::default()
        };
        assert!(q.matches(&summary(Some("42"), 0.0, 0.0)));
        assert!(!q.matches(&summary(Some("43"), 0.0, 0.0)));
        assert!(!q.matches(&summary(None, 0.0, 0.0)));
    }

    #[test]
    fn test_time_filter_excludes_missing_time() {
        let q = ProfileQuery {
            time: TimeRange::new(Some(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()), None),
            ..Default::default()
        };
        let mut p = summary(None, 0.0, 0.0);
        assert!(q.matches(&p));
        p.profile_time = None;
        assert!(!q.matches(&p));
    }

    #[test]
    fn test_bbox_uses_lon_lat_order() {
        let q = ProfileQuery {
            bbox: Some(BoundingBox::new(-60.0, 10.0, -50.0, 20.0)),
            ..Default::default()
        };
        assert!(q.matches(&summary(None, -55.0, 15.0)));
        assert!(!q.matches(&summary(None, 15.0, -55.0)));
    }
}
