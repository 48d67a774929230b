use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use facmon_models::filters::ReadingFilter;
use facmon_models::models::Reading;
use facmon_utils::logging::prelude::*;

use crate::api::{parse_date_range, AppState};
use crate::store::StoreError;

const DEFAULT_QUERY_LIMIT: i64 = 1000;
const MAX_QUERY_LIMIT: i64 = 10_000;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/data/query", get(query_readings))
        .route("/api/readings/:id/fft", get(get_fft))
}

#[derive(Debug, Deserialize)]
pub struct DataQuery {
    machine_id: Option<String>,
    bearing_id: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    limit: Option<i64>,
}

async fn query_readings(
    State(state): State<AppState>,
    Query(query): Query<DataQuery>,
) -> Result<Json<Vec<Reading>>, (StatusCode, Json<serde_json::Value>)> {
    let range = parse_date_range(query.start_date.as_deref(), query.end_date.as_deref())?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_QUERY_LIMIT)
        .clamp(1, MAX_QUERY_LIMIT);
    let filter = ReadingFilter {
        bearing_id: query.bearing_id,
        machine_id: query.machine_id,
        range,
    };

    match state.store.query_readings(&filter, limit) {
        Ok(readings) => Ok(Json(readings)),
        Err(StoreError::Unavailable(e)) => {
            warn!("Store unreachable while querying readings: {}", e);
            Ok(Json(Vec::new()))
        }
        Err(e) => {
            error!("Failed to query readings: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to query readings"})),
            ))
        }
    }
}

async fn get_fft(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let reading = match state.store.get_reading(&id) {
        Ok(Some(reading)) => reading,
        Ok(None) => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "Reading not found"})),
            ));
        }
        Err(StoreError::Unavailable(e)) => {
            warn!("Store unreachable while fetching reading {}: {}", id, e);
            return Err((
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "Reading not found"})),
            ));
        }
        Err(e) => {
            error!("Failed to fetch reading {}: {:?}", id, e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to fetch reading"})),
            ));
        }
    };

    // FFT blocks pass through exactly as stored.
    match reading.fft_data {
        Some(fft) => Ok(Json(fft)),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "FFT data not available"})),
        )),
    }
}
