use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use facmon_models::models::Bearing;
use facmon_utils::logging::prelude::*;

use crate::api::AppState;
use crate::store::StoreError;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/bearings", get(list_bearings))
}

#[derive(Debug, Deserialize)]
pub struct BearingQuery {
    // Missing machine_id rejects the request before the handler runs.
    machine_id: String,
}

async fn list_bearings(
    State(state): State<AppState>,
    Query(query): Query<BearingQuery>,
) -> Result<Json<Vec<Bearing>>, (StatusCode, Json<serde_json::Value>)> {
    match state.store.bearings_for_machine(&query.machine_id) {
        Ok(bearings) => Ok(Json(bearings)),
        Err(StoreError::Unavailable(e)) => {
            warn!(
                "Store unreachable while listing bearings for {}: {}",
                query.machine_id, e
            );
            Ok(Json(Vec::new()))
        }
        Err(e) => {
            error!(
                "Failed to list bearings for {}: {:?}",
                query.machine_id, e
            );
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to fetch bearings"})),
            ))
        }
    }
}
