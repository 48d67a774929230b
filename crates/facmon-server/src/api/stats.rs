use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;

use facmon_models::models::SystemStats;
use facmon_utils::logging::prelude::*;

use crate::api::AppState;
use crate::store::StoreError;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/stats", get(system_stats))
}

async fn system_stats(
    State(state): State<AppState>,
) -> Result<Json<SystemStats>, (StatusCode, Json<serde_json::Value>)> {
    match state.store.system_stats() {
        Ok(stats) => Ok(Json(stats)),
        Err(StoreError::Unavailable(e)) => {
            warn!("Store unreachable for system stats: {}", e);
            Ok(Json(SystemStats {
                machines_count: 0,
                bearings_count: 0,
                data_records_count: 0,
                timestamp: Utc::now(),
            }))
        }
        Err(e) => {
            error!("Failed to compute system stats: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to compute system stats"})),
            ))
        }
    }
}
