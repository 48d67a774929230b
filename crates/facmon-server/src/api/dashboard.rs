use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use facmon_models::models::{HourlyTrend, KpiStats, StatusTrend};
use facmon_utils::logging::prelude::*;

use crate::api::{parse_date_range, AppState};
use crate::store::StoreError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/dashboard/kpis", get(kpis))
        .route("/api/dashboard/trends/hourly", get(hourly_trend))
        .route("/api/dashboard/trends/status", get(status_trend))
}

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    start_date: Option<String>,
    end_date: Option<String>,
    customer: Option<String>,
}

async fn kpis(
    State(state): State<AppState>,
    Query(query): Query<TrendQuery>,
) -> Result<Json<KpiStats>, (StatusCode, Json<serde_json::Value>)> {
    let range = parse_date_range(query.start_date.as_deref(), query.end_date.as_deref())?;
    match state.store.kpi_stats(&range, state.kpi_dual_timestamps) {
        Ok(stats) => Ok(Json(stats)),
        Err(StoreError::Unavailable(e)) => {
            warn!("Store unreachable for KPI stats: {}", e);
            Ok(Json(KpiStats::default()))
        }
        Err(e) => {
            error!("Failed to compute KPI stats: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to compute KPI stats"})),
            ))
        }
    }
}

async fn hourly_trend(
    State(state): State<AppState>,
    Query(query): Query<TrendQuery>,
) -> Result<Json<Vec<HourlyTrend>>, (StatusCode, Json<serde_json::Value>)> {
    let range = parse_date_range(query.start_date.as_deref(), query.end_date.as_deref())?;
    match state.store.hourly_trend(&range) {
        Ok(trend) => Ok(Json(trend)),
        Err(StoreError::Unavailable(e)) => {
            warn!("Store unreachable for hourly trend: {}", e);
            Ok(Json(Vec::new()))
        }
        Err(e) => {
            error!("Failed to compute hourly trend: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to compute hourly trend"})),
            ))
        }
    }
}

async fn status_trend(
    State(state): State<AppState>,
    Query(query): Query<TrendQuery>,
) -> Result<Json<Vec<StatusTrend>>, (StatusCode, Json<serde_json::Value>)> {
    let range = parse_date_range(query.start_date.as_deref(), query.end_date.as_deref())?;
    match state.store.status_trend(&range, query.customer.as_deref()) {
        Ok(trend) => Ok(Json(trend)),
        Err(StoreError::Unavailable(e)) => {
            warn!("Store unreachable for status trend: {}", e);
            Ok(Json(Vec::new()))
        }
        Err(e) => {
            error!("Failed to compute status trend: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to compute status trend"})),
            ))
        }
    }
}
