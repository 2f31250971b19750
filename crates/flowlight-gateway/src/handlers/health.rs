//! Liveness and health endpoints.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use flowlight_engine::ConnectionStatus;

use crate::state::AppState;

/// Root endpoint response.
#[derive(Debug, Serialize)]
pub struct RootResponse {
    /// Greeting.
    pub message: &'static str,
    /// Always `healthy`.
    pub status: &'static str,
    /// Engine the gateway forwards to.
    pub node_red_url: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `healthy` while the gateway answers.
    pub api_status: &'static str,
    /// Result of probing the engine.
    pub node_red_status: ConnectionStatus,
    /// `ready` or `unavailable`.
    pub device_status: &'static str,
    /// When the check ran.
    pub timestamp: DateTime<Utc>,
}

/// `GET /`
pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "Flowlight API is running",
        status: "healthy",
        node_red_url: state.engine.base_url().to_string(),
    })
}

/// `GET /api/health`
///
/// Never fails: an unreachable engine is reported in `node_red_status`.
///
/// ```text
/// {
///   "api_status": "healthy",
///   "node_red_status": {"status": "connected", "message": "...", "url": "..."},
///   "device_status": "ready",
///   "timestamp": "2025-01-01T00:00:00Z"
/// }
/// ```
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let node_red_status = state.engine.check_connection().await;
    tracing::debug!(status = ?node_red_status.status, "Health check");

    Json(HealthResponse {
        api_status: "healthy",
        node_red_status,
        device_status: if state.device_ready() {
            "ready"
        } else {
            "unavailable"
        },
        timestamp: Utc::now(),
    })
}
