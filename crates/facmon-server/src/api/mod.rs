//! # API Routes Aggregator Module
//!
//! Aggregates all API routes and provides the main router configuration.

pub mod bearings;
pub mod dashboard;
pub mod data;
pub mod machines;
pub mod stats;

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::NaiveDate;
use tower_http::cors::CorsLayer;

use facmon_models::filters::DateRange;

use crate::store::SharedStore;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    /// When true, date-bounded KPI queries also count epoch-only readings.
    pub kpi_dual_timestamps: bool,
}

/// Configures and returns the main application router with all API routes.
pub fn configure_api_routes(state: AppState) -> Router {
    Router::new()
        .merge(machines::routes())
        .merge(bearings::routes())
        .merge(data::routes())
        .merge(dashboard::routes())
        .merge(stats::routes())
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint handler.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({"status": "healthy"})),
    )
}

/// Parses `YYYY-MM-DD` query bounds into an inclusive instant range: the
/// start bound at midnight, the end bound at the last second of its day.
pub(crate) fn parse_date_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<DateRange, (StatusCode, Json<serde_json::Value>)> {
    let parse = |value: &str, h: u32, m: u32, s: u32| {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(h, m, s))
            .map(|dt| dt.and_utc())
            .ok_or_else(|| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({
                        "error": format!("Invalid date '{}', expected YYYY-MM-DD", value)
                    })),
                )
            })
    };

    let start = match start {
        Some(value) => Some(parse(value, 0, 0, 0)?),
        None => None,
    };
    let end = match end {
        Some(value) => Some(parse(value, 23, 59, 59)?),
        None => None,
    };
    Ok(DateRange::new(start, end))
}
