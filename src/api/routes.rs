use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;

use crate::api::latency::{FetchPath, PathLatency};
use crate::error::AppError;
use crate::service::NumberService;
use crate::types::NumbersResponse;

#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<NumberService>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(get_index))
        .route("/numbers/:code", get(get_numbers))
        .route("/health", get(get_health))
        .route("/stats/latency", get(get_stats_latency))
        .fallback(not_found)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub window_size: usize,
    pub window_len: usize,
    pub requests_served: u64,
    pub upstream_fresh: u64,
    pub upstream_fallbacks: u64,
    pub last_fallback_at_ns: u64,
}

#[derive(Serialize)]
pub struct LatencyResponse {
    pub samples: u64,
    pub fresh: PathLatency,
    pub fallback: PathLatency,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_index() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Average Calculator API",
        "usage": {
            "endpoints": {
                "/numbers/p": "Get prime numbers",
                "/numbers/f": "Get fibonacci numbers",
                "/numbers/e": "Get even numbers",
                "/numbers/r": "Get random numbers"
            }
        }
    }))
}

/// A path segment that cannot be decoded (e.g. invalid UTF-8) is still just an
/// unknown code, answered with the same JSON body.
async fn get_numbers(
    State(state): State<ApiState>,
    code: std::result::Result<Path<String>, PathRejection>,
) -> Result<Json<NumbersResponse>, AppError> {
    let Path(code) = code.map_err(|rejection| AppError::UnknownCategory(rejection.body_text()))?;
    state.service.handle(&code).await.map(Json)
}

async fn get_health(State(state): State<ApiState>) -> Result<Json<HealthResponse>, AppError> {
    let window = state.service.window();
    let health = state.service.health();
    let window_len = window.snapshot()?.len();

    Ok(Json(HealthResponse {
        status: "ok",
        window_size: window.capacity(),
        window_len,
        requests_served: health.requests_served(),
        upstream_fresh: health.upstream_fresh(),
        upstream_fallbacks: health.upstream_fallbacks(),
        last_fallback_at_ns: health.last_fallback_at_ns(),
    }))
}

async fn get_stats_latency(State(state): State<ApiState>) -> Json<LatencyResponse> {
    let stats = state.service.latency();
    Json(LatencyResponse {
        samples: stats.samples(),
        fresh: stats.summary(FetchPath::Fresh),
        fallback: stats.summary(FetchPath::Fallback),
    })
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not Found" })))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
