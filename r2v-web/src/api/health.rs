//! Health check endpoints

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::services::api_client::{PingResult, DEFAULT_PING_PATHS};
use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status ("ok")
    pub status: String,
    /// Module name ("r2v-web")
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Last error message if any (for diagnostics)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Reachability of the configured backend
#[derive(Debug, Serialize)]
pub struct BackendStatusResponse {
    pub base_url: String,
    #[serde(flatten)]
    pub ping: PingResult,
}

/// GET /health and GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;

    let last_error = state.last_error.read().await.clone();

    Json(HealthResponse {
        status: "ok".to_string(),
        module: "r2v-web".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        last_error,
    })
}

/// GET /api/backend/status
///
/// Probes the backend's root and health paths.
pub async fn backend_status(State(state): State<AppState>) -> Json<BackendStatusResponse> {
    let ping = state.backend.ping_server(DEFAULT_PING_PATHS).await;
    Json(BackendStatusResponse {
        base_url: state.backend.base_url().to_string(),
        ping,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/health", get(health_check))
        .route("/api/backend/status", get(backend_status))
}
