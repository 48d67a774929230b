use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use facmon_models::filters::{MachineFilter, ReadingFilter};
use facmon_models::models::{Machine, Reading};
use facmon_utils::logging::prelude::*;

use crate::api::{parse_date_range, AppState};
use crate::store::StoreError;

const DEFAULT_TIMESERIES_LIMIT: i64 = 1000;
const MAX_TIMESERIES_LIMIT: i64 = 10_000;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/machines", get(list_machines))
        .route("/api/machines/search", get(list_machines))
        .route("/api/machines/:id", get(get_machine))
        .route("/api/machines/:id/latest-readings", get(latest_readings))
        .route("/api/machines/:id/timeseries", get(timeseries))
}

#[derive(Debug, Deserialize)]
pub struct MachineQuery {
    customer: Option<String>,
    area: Option<String>,
    subarea: Option<String>,
    machine_name: Option<String>,
    status: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

impl MachineQuery {
    fn into_filter(self) -> MachineFilter {
        MachineFilter {
            customer: self.customer,
            area: self.area,
            subarea: self.subarea,
            machine_name: self.machine_name,
            status: self.status,
            ingested_after: self.start_date,
            ingested_before: self.end_date,
        }
        .normalized()
    }
}

async fn list_machines(
    State(state): State<AppState>,
    Query(query): Query<MachineQuery>,
) -> Result<Json<Vec<Machine>>, (StatusCode, Json<serde_json::Value>)> {
    match state.store.list_machines(&query.into_filter()) {
        Ok(machines) => Ok(Json(machines)),
        Err(StoreError::Unavailable(e)) => {
            warn!("Store unreachable while listing machines: {}", e);
            Ok(Json(Vec::new()))
        }
        Err(e) => {
            error!("Failed to list machines: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to fetch machines"})),
            ))
        }
    }
}

async fn get_machine(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Machine>, (StatusCode, Json<serde_json::Value>)> {
    match state.store.get_machine(&id) {
        Ok(Some(machine)) => Ok(Json(machine)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Machine not found"})),
        )),
        Err(StoreError::Unavailable(e)) => {
            warn!("Store unreachable while fetching machine {}: {}", id, e);
            Err((
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "Machine not found"})),
            ))
        }
        Err(e) => {
            error!("Failed to fetch machine {}: {:?}", id, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to fetch machine"})),
            ))
        }
    }
}

/// One bearing's latest reading joined with its registered location.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestReading {
    pub bearing_location: String,
    #[serde(flatten)]
    pub reading: Reading,
}

async fn latest_readings(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<LatestReading>>, (StatusCode, Json<serde_json::Value>)> {
    let readings = match state.store.latest_readings(&id) {
        Ok(readings) => readings,
        Err(StoreError::Unavailable(e)) => {
            warn!("Store unreachable for latest readings of {}: {}", id, e);
            return Ok(Json(Vec::new()));
        }
        Err(e) => {
            error!("Failed to fetch latest readings for {}: {:?}", id, e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to fetch latest readings"})),
            ));
        }
    };

    // Bearings without a registry entry still surface their reading, just
    // with an unknown location.
    let bearings = state.store.bearings_for_machine(&id).unwrap_or_default();
    let joined = readings
        .into_iter()
        .map(|reading| {
            let bearing_location = bearings
                .iter()
                .find(|b| b.id == reading.bearing_id)
                .map(|b| b.bearing_location.clone())
                .unwrap_or_else(|| "Unknown".to_string());
            LatestReading {
                bearing_location,
                reading,
            }
        })
        .collect();
    Ok(Json(joined))
}

#[derive(Debug, Deserialize)]
pub struct TimeseriesQuery {
    metric: String,
    // Missing bearing_id rejects the request before the handler runs.
    bearing_id: String,
    start_date: Option<String>,
    end_date: Option<String>,
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TimeseriesPoint {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub value: f64,
}

async fn timeseries(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<TimeseriesQuery>,
) -> Result<Json<Vec<TimeseriesPoint>>, (StatusCode, Json<serde_json::Value>)> {
    if !matches!(
        query.metric.as_str(),
        "temperature" | "acceleration" | "velocity"
    ) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "Unknown metric, expected temperature, acceleration, or velocity"
            })),
        ));
    }
    let range = parse_date_range(query.start_date.as_deref(), query.end_date.as_deref())?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_TIMESERIES_LIMIT)
        .clamp(1, MAX_TIMESERIES_LIMIT);

    let filter = ReadingFilter {
        bearing_id: Some(query.bearing_id.clone()),
        machine_id: Some(id.clone()),
        range,
    };
    let readings = match state.store.query_readings(&filter, limit) {
        Ok(readings) => readings,
        Err(StoreError::Unavailable(e)) => {
            warn!("Store unreachable for timeseries of {}: {}", id, e);
            return Ok(Json(Vec::new()));
        }
        Err(e) => {
            error!("Failed to fetch timeseries for {}: {:?}", id, e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to fetch timeseries"})),
            ));
        }
    };

    // Points without a timestamp or without the requested metric are dropped.
    let points = readings
        .into_iter()
        .filter_map(|reading| {
            let timestamp = reading.timestamp()?;
            let value = metric_value(&reading, &query.metric)?;
            Some(TimeseriesPoint { timestamp, value })
        })
        .collect();
    Ok(Json(points))
}

fn metric_value(reading: &Reading, metric: &str) -> Option<f64> {
    match metric {
        "temperature" => reading.temperature,
        "acceleration" => rms_of(reading.acceleration.as_ref()),
        "velocity" => rms_of(reading.velocity.as_ref()),
        _ => None,
    }
}

fn rms_of(block: Option<&serde_json::Value>) -> Option<f64> {
    block?.get("rms")?.as_f64()
}
