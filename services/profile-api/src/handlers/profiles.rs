//! Profile listing and detail handlers.

use std::sync::Arc;

use argo_common::{
    parse_timestamp, ArgoError, BoundingBox, FloatId, ProfileSummary, RadiusFilter, StoredProfile,
    TimeRange,
};
use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use storage::query::{ProfileQuery, DEFAULT_LIMIT};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for `GET /profiles`.
///
/// Everything arrives as text so malformed values produce a JSON 400
/// rather than an extractor rejection.
#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
    pub float_id: Option<String>,
    pub time_gte: Option<String>,
    pub time_lte: Option<String>,
    /// `minLon,minLat,maxLon,maxLat`
    pub bbox: Option<String>,
    /// `lon,lat,radiusKm`
    pub near: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListParams {
    pub fn into_query(self) -> Result<ProfileQuery, ArgoError> {
        let float_id = non_empty(self.float_id).map(FloatId::new);

        let start = non_empty(self.time_gte)
            .map(|s| parse_time("time_gte", &s))
            .transpose()?;
        let end = non_empty(self.time_lte)
            .map(|s| parse_time("time_lte", &s))
            .transpose()?;

        let bbox = match non_empty(self.bbox) {
            Some(raw) => {
                let bbox = BoundingBox::from_query_string(&raw)
                    .map_err(|e| ArgoError::InvalidBbox(e.to_string()))?;
                if bbox.min_x > bbox.max_x || bbox.min_y > bbox.max_y {
                    return Err(ArgoError::InvalidBbox(format!(
                        "minimum exceeds maximum in '{raw}'"
                    )));
                }
                Some(bbox)
            }
            None => None,
        };

        let near = match non_empty(self.near) {
            Some(raw) => {
                let near = RadiusFilter::from_query_string(&raw)
                    .map_err(|e| ArgoError::invalid_parameter("near", e.to_string()))?;
                if near.radius_km < 0.0 {
                    return Err(ArgoError::invalid_parameter(
                        "near",
                        "radius must not be negative",
                    ));
                }
                Some(near)
            }
            None => None,
        };

        let limit = parse_count("limit", self.limit)?.unwrap_or(DEFAULT_LIMIT);
        let offset = parse_count("offset", self.offset)?.unwrap_or(0);

        Ok(ProfileQuery {
            float_id,
            time: TimeRange::new(start, end),
            bbox,
            near,
            limit,
            offset,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn parse_time(param: &str, raw: &str) -> Result<DateTime<Utc>, ArgoError> {
    parse_timestamp(raw).map_err(|e| ArgoError::InvalidTime(format!("{param}: {e}")))
}

fn parse_count(param: &str, raw: Option<String>) -> Result<Option<i64>, ArgoError> {
    match non_empty(raw) {
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(n) if n >= 0 => Ok(Some(n)),
            _ => Err(ArgoError::invalid_parameter(
                param,
                format!("expected a non-negative integer, got '{raw}'"),
            )),
        },
        None => Ok(None),
    }
}

/// GeoJSON point geometry.
#[derive(Debug, Serialize)]
pub struct Location {
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

impl Location {
    fn point(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: "Point",
            coordinates: [longitude, latitude],
        }
    }
}

/// One entry of the profile listing.
#[derive(Debug, Serialize)]
pub struct ProfileItem {
    pub id: i64,
    pub float_id: Option<FloatId>,
    pub profile_time: Option<String>,
    pub location: Location,
    pub source_file: String,
}

impl From<ProfileSummary> for ProfileItem {
    fn from(p: ProfileSummary) -> Self {
        Self {
            id: p.id,
            float_id: p.float_id,
            profile_time: p.profile_time.map(format_time),
            location: Location::point(p.longitude, p.latitude),
            source_file: p.source_file,
        }
    }
}

/// A profile with its measurements; extras are flattened into each row.
#[derive(Debug, Serialize)]
pub struct ProfileDetail {
    pub id: i64,
    pub float_id: Option<FloatId>,
    pub profile_time: Option<String>,
    pub source_file: String,
    pub measurements: Vec<Map<String, Value>>,
    pub location: Location,
}

impl From<StoredProfile> for ProfileDetail {
    fn from(stored: StoredProfile) -> Self {
        let p = stored.profile;
        Self {
            id: p.id,
            float_id: p.float_id,
            profile_time: p.profile_time.map(format_time),
            source_file: p.source_file,
            measurements: stored.measurements.iter().map(|m| m.flattened()).collect(),
            location: Location::point(p.longitude, p.latitude),
        }
    }
}

fn format_time(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// GET /profiles
pub async fn list_profiles_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ProfileItem>>, ApiError> {
    let query = params.into_query()?;
    let profiles = state.reader.list_profiles(&query).await?;

    debug!(count = profiles.len(), "Listed profiles");
    Ok(Json(profiles.into_iter().map(ProfileItem::from).collect()))
}

/// GET /profiles/:id
pub async fn get_profile_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProfileDetail>, ApiError> {
    let id: i64 = id
        .trim()
        .parse()
        .map_err(|_| ArgoError::invalid_parameter("id", format!("not an integer: '{id}'")))?;

    match state.reader.get_profile(id).await? {
        Some(stored) => Ok(Json(ProfileDetail::from(stored))),
        None => Err(ArgoError::ProfileNotFound(id).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_empty_params_use_defaults() {
        let query = ListParams::default().into_query().unwrap();
        assert_eq!(query, ProfileQuery::default());
        assert_eq!(query.limit, 5000);
    }

    #[test]
    fn test_all_filters_parsed() {
        let params = ListParams {
            float_id: Some("5904567".into()),
            time_gte: Some("2021-01-01".into()),
            time_lte: Some("2021-12-31T23:59:59Z".into()),
            bbox: Some("140,-50,160,-30".into()),
            near: Some("150,-40,250".into()),
            limit: Some("10".into()),
            offset: Some("20".into()),
        };
        let query = params.into_query().unwrap();

        assert_eq!(query.float_id, Some(FloatId::new("5904567")));
        assert_eq!(query.time.start, Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).single());
        assert_eq!(
            query.time.end,
            Utc.with_ymd_and_hms(2021, 12, 31, 23, 59, 59).single()
        );
        assert_eq!(query.bbox, Some(BoundingBox::new(140.0, -50.0, 160.0, -30.0)));
        assert_eq!(query.near.map(|n| n.radius_km), Some(250.0));
        assert_eq!((query.limit, query.offset), (10, 20));
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let params = ListParams {
            float_id: Some("".into()),
            bbox: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(params.into_query().unwrap(), ProfileQuery::default());
    }

    #[test]
    fn test_malformed_values_rejected() {
        let cases = [
            ListParams {
                bbox: Some("1,2,3".into()),
                ..Default::default()
            },
            ListParams {
                bbox: Some("10,0,5,1".into()),
                ..Default::default()
            },
            ListParams {
                near: Some("1,2,-3".into()),
                ..Default::default()
            },
            ListParams {
                time_gte: Some("yesterday".into()),
                ..Default::default()
            },
            ListParams {
                limit: Some("-1".into()),
                ..Default::default()
            },
            ListParams {
                offset: Some("many".into()),
                ..Default::default()
            },
        ];

        for params in cases {
            let err = params.into_query().unwrap_err();
            assert_eq!(err.http_status_code(), 400, "{err}");
        }
    }

    #[test]
    fn test_time_formatted_with_millis() {
        let t = Utc.with_ymd_and_hms(2021, 12, 25, 12, 0, 0).unwrap();
        assert_eq!(format_time(t), "2021-12-25T12:00:00.000Z");
    }
}
