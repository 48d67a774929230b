//! Handler tests served from the in-memory fixture store.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use facmon_server::api::{configure_api_routes, AppState};
use facmon_server::store::FixtureStore;

fn test_app() -> Router {
    let state = AppState {
        store: Arc::new(FixtureStore::with_sample_data()),
        kpi_dual_timestamps: false,
    };
    configure_api_routes(state)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    // Rejections (e.g. missing query params) come back as plain text.
    let json = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&bytes).to_string()));
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get_json(test_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_list_machines() {
    let (status, body) = get_json(test_app(), "/api/machines").await;
    assert_eq!(status, StatusCode::OK);
    let machines = body.as_array().unwrap();
    assert_eq!(machines.len(), 2);
    assert_eq!(machines[0]["machineName"], "Pump A1");
}

#[tokio::test]
async fn test_search_matches_substring_case_insensitive() {
    let (status, body) = get_json(test_app(), "/api/machines/search?customer=factory").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_search_accepts_snake_case_params() {
    let (status, body) = get_json(test_app(), "/api/machines/search?machine_name=pump").await;
    assert_eq!(status, StatusCode::OK);
    let machines = body.as_array().unwrap();
    assert_eq!(machines.len(), 1);
    assert_eq!(machines[0]["machineName"], "Pump A1");
}

#[tokio::test]
async fn test_search_with_no_catalog_match_synthesizes_from_bearings() {
    let (status, body) = get_json(test_app(), "/api/machines/search?customer=nobody").await;
    assert_eq!(status, StatusCode::OK);
    // The empty catalog result falls back to placeholders derived from the
    // bearing registry.
    let machines = body.as_array().unwrap();
    assert_eq!(machines.len(), 2);
    assert_eq!(machines[0]["customer"], "Unknown");
}

#[tokio::test]
async fn test_get_machine() {
    let (status, body) = get_json(test_app(), "/api/machines/machine_001").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "machine_001");

    let (status, body) = get_json(test_app(), "/api/machines/machine_999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Machine not found");
}

#[tokio::test]
async fn test_latest_readings_one_per_bearing_normalized() {
    let (status, body) = get_json(test_app(), "/api/machines/machine_001/latest-readings").await;
    assert_eq!(status, StatusCode::OK);
    let readings = body.as_array().unwrap();
    assert_eq!(readings.len(), 2);
    for reading in readings {
        assert!(reading["timestamp"].is_string());
        assert!(reading.get("recordedEpoch").is_none());
        assert!(reading["bearingLocation"].is_string());
    }
}

#[tokio::test]
async fn test_timeseries_rejects_unknown_metric() {
    let (status, _) = get_json(
        test_app(),
        "/api/machines/machine_001/timeseries?metric=voltage&bearing_id=machine_001_bearing_a",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_timeseries_requires_bearing_id() {
    let (status, _) = get_json(
        test_app(),
        "/api/machines/machine_001/timeseries?metric=acceleration",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_timeseries_extracts_rms() {
    let (status, body) = get_json(
        test_app(),
        "/api/machines/machine_001/timeseries?metric=acceleration&bearing_id=machine_001_bearing_a",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let points = body.as_array().unwrap();
    assert_eq!(points.len(), 1);
    for point in points {
        assert!(point["value"].as_f64().unwrap() > 0.0);
        assert!(point["timestamp"].is_string());
    }
}

#[tokio::test]
async fn test_timeseries_is_scoped_to_the_requested_bearing() {
    // machine_001 has a temperature reading on each of its two bearings;
    // only the requested bearing's point comes back.
    let (status, body) = get_json(
        test_app(),
        "/api/machines/machine_001/timeseries?metric=temperature&bearing_id=machine_001_bearing_a",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_timeseries_respects_date_bounds() {
    let tomorrow = (chrono::Utc::now() + chrono::Duration::days(1))
        .format("%Y-%m-%d")
        .to_string();
    let uri = format!(
        "/api/machines/machine_001/timeseries?metric=temperature&bearing_id=machine_001_bearing_a&start_date={}",
        tomorrow
    );

    let (status, body) = get_json(test_app(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_bearings_requires_machine_id() {
    let (status, _) = get_json(test_app(), "/api/bearings").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get_json(test_app(), "/api/bearings?machine_id=machine_001").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_data_query_rejects_bad_dates() {
    let (status, _) = get_json(test_app(), "/api/data/query?start_date=yesterday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_data_query_filters_by_machine() {
    let (status, body) = get_json(test_app(), "/api/data/query?machine_id=machine_002").await;
    assert_eq!(status, StatusCode::OK);
    let readings = body.as_array().unwrap();
    assert_eq!(readings.len(), 2);
    for reading in readings {
        assert_eq!(reading["machineId"], "machine_002");
    }
}

#[tokio::test]
async fn test_fft_passthrough() {
    let (status, body) = get_json(test_app(), "/api/readings/reading_001/fft").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["frequencies"].is_array());

    let (status, body) = get_json(test_app(), "/api/readings/reading_999/fft").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Reading not found");
}

#[tokio::test]
async fn test_dashboard_kpis_unbounded_counts_everything() {
    let (status, body) = get_json(test_app(), "/api/dashboard/kpis").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_readings"], 4);
    assert_eq!(body["status_counts"]["Normal"], 2);
    assert_eq!(body["status_counts"]["Alert"], 1);
    assert_eq!(body["status_counts"]["Satisfactory"], 1);
    assert_eq!(body["status_counts"]["Unacceptable"], 0);
}

#[tokio::test]
async fn test_dashboard_kpis_bounded_counts_instants_only() {
    // Sample data alternates representations; with dual timestamps off, a
    // bounded range only sees the structured half.
    let start = (chrono::Utc::now() - chrono::Duration::days(1))
        .format("%Y-%m-%d")
        .to_string();
    let end = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let uri = format!("/api/dashboard/kpis?start_date={}&end_date={}", start, end);

    let (status, body) = get_json(test_app(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_readings"], 2);
}

#[tokio::test]
async fn test_dashboard_hourly_trend_omits_empty_hours() {
    let (status, body) = get_json(test_app(), "/api/dashboard/trends/hourly").await;
    assert_eq!(status, StatusCode::OK);

    // The four sample readings sit in four distinct hours; no zero-count
    // buckets appear and the hours come back sorted.
    let buckets = body.as_array().unwrap();
    assert_eq!(buckets.len(), 4);
    let hours: Vec<i64> = buckets
        .iter()
        .map(|b| b["hour"].as_i64().unwrap())
        .collect();
    let mut sorted = hours.clone();
    sorted.sort_unstable();
    assert_eq!(hours, sorted);
    for bucket in buckets {
        assert_eq!(bucket["count"].as_i64().unwrap(), 1);
    }
}

#[tokio::test]
async fn test_dashboard_status_trend_scoped_to_customer() {
    let (status, body) = get_json(
        test_app(),
        "/api/dashboard/trends/status?customer=Factory%20Corp",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.as_array().unwrap().is_empty());

    // Exact-match customer with no machines yields an empty trend.
    let (status, body) = get_json(test_app(), "/api/dashboard/trends/status?customer=factory").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_system_stats() {
    let (status, body) = get_json(test_app(), "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["machines_count"], 2);
    assert_eq!(body["bearings_count"], 4);
    assert_eq!(body["data_records_count"], 4);
    assert!(body["timestamp"].is_string());
}
