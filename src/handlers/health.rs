use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use utoipa::ToSchema;

/// Tracks application start time for uptime calculation
static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize the start time (call this on application startup)
pub fn init_start_time() {
    let _ = START_TIME.get_or_init(Instant::now);
}

fn get_uptime_secs() -> u64 {
    START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Up,
    Down,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub database: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_error: Option<String>,
    pub latency_ms: u64,
    pub uptime_secs: u64,
    pub version: String,
    pub timestamp: String,
}

/// Creates the router for the health endpoint
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

/// Reports whether the database answers a ping
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service and database are up", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let db_result = crate::db::check_connection(state.db.get_pool()).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let (status_code, status, database) = if db_result.is_ok() {
        (StatusCode::OK, HealthStatus::Healthy, ComponentStatus::Up)
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            HealthStatus::Unhealthy,
            ComponentStatus::Down,
        )
    };

    let response = HealthResponse {
        status,
        database,
        database_error: db_result.err().map(|e| e.to_string()),
        latency_ms,
        uptime_secs: get_uptime_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    (status_code, Json(response))
}
