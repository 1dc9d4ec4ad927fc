//! Router tests against the in-memory store.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;

use profile_api::state::AppState;
use test_utils::{sample_profile, MemoryStore, LATITUDE, LONGITUDE};

fn app(store: &MemoryStore) -> Router {
    profile_api::router(Arc::new(AppState::new(Arc::new(store.clone()))))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

/// Three profiles: two for float 111 in 2021 and 2022, one untimed far away.
fn seeded_store() -> (MemoryStore, [i64; 3]) {
    let store = MemoryStore::new();

    let mut older = sample_profile("older.nc", Some("111"), 2);
    older.profile_time = Utc.with_ymd_and_hms(2021, 3, 1, 0, 0, 0).single();
    let mut newer = sample_profile("newer.nc", Some("111"), 3);
    newer.profile_time = Utc.with_ymd_and_hms(2022, 3, 1, 0, 0, 0).single();
    let mut untimed = sample_profile("untimed.nc", Some("222"), 1);
    untimed.profile_time = None;
    untimed.latitude = 10.0;
    untimed.longitude = -30.0;

    let ids = [store.seed(&older), store.seed(&newer), store.seed(&untimed)];
    (store, ids)
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(app(&MemoryStore::new()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_list_orders_newest_first_with_untimed_last() {
    let (store, [older, newer, untimed]) = seeded_store();
    let (status, body) = get(app(&store), "/profiles").await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![newer, older, untimed]);

    let first = &body[0];
    assert_eq!(first["float_id"], "111");
    assert_eq!(first["profile_time"], "2022-03-01T00:00:00.000Z");
    assert_eq!(first["location"]["type"], "Point");
    assert_eq!(first["location"]["coordinates"][0], LONGITUDE);
    assert_eq!(first["location"]["coordinates"][1], LATITUDE);
    assert_eq!(first["source_file"], "newer.nc");
    assert!(body[2]["profile_time"].is_null());
}

#[tokio::test]
async fn test_list_filters() {
    let (store, [older, newer, untimed]) = seeded_store();

    let (_, body) = get(app(&store), "/profiles?float_id=222").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"].as_i64(), Some(untimed));

    let (_, body) = get(
        app(&store),
        "/profiles?time_gte=2021-01-01&time_lte=2021-12-31T23:59:59Z",
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"].as_i64(), Some(older));

    let (_, body) = get(app(&store), "/profiles?bbox=-40,0,-20,20").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"].as_i64(), Some(untimed));

    let near = format!("/profiles?near={LONGITUDE},{LATITUDE},1");
    let (_, body) = get(app(&store), &near).await;
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![newer, older]);
}

#[tokio::test]
async fn test_list_pagination() {
    let (store, [older, _, _]) = seeded_store();
    let (_, body) = get(app(&store), "/profiles?limit=1&offset=1").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"].as_i64(), Some(older));
}

#[tokio::test]
async fn test_list_rejects_bad_parameters() {
    let store = MemoryStore::new();
    for uri in [
        "/profiles?bbox=1,2,3",
        "/profiles?near=abc",
        "/profiles?time_gte=not-a-time",
        "/profiles?limit=ten",
    ] {
        let (status, body) = get(app(&store), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn test_get_profile_flattens_measurements() {
    let (store, [_, newer, _]) = seeded_store();
    let (status, body) = get(app(&store), &format!("/profiles/{newer}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"].as_i64(), Some(newer));
    assert_eq!(body["source_file"], "newer.nc");
    assert_eq!(body["location"]["type"], "Point");

    let measurements = body["measurements"].as_array().unwrap();
    assert_eq!(measurements.len(), 3);
    assert_eq!(measurements[0]["depth"], 0.0);
    assert_eq!(measurements[0]["doxy"], 200.0);
    assert_eq!(measurements[2]["depth"], 2.0);
    assert_eq!(measurements[2]["doxy"], 202.0);
    assert!(measurements[1].get("doxy").is_none());
    assert_eq!(measurements[1]["salinity"], 35.0);
}

#[tokio::test]
async fn test_get_unknown_profile_is_404() {
    let (status, body) = get(app(&MemoryStore::new()), "/profiles/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not found");
}

#[tokio::test]
async fn test_get_non_numeric_id_is_400() {
    let (status, _) = get(app(&MemoryStore::new()), "/profiles/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
