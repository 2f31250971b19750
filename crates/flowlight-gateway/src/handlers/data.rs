//! Engine passthrough endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, RawQuery, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

/// Tag identifying where proxied data came from.
pub const SOURCE: &str = "node-red";

/// Envelope around a proxied engine response.
#[derive(Debug, Serialize)]
pub struct ProxyResponse {
    /// Always `true`; failures are returned as errors.
    pub success: bool,
    /// Body of a forwarded read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Body of a forwarded write.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    /// Always `node-red`.
    pub source: &'static str,
    /// Engine endpoint that was called.
    pub endpoint: String,
    /// When the gateway answered.
    pub timestamp: DateTime<Utc>,
}

impl ProxyResponse {
    fn read(endpoint: String, data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            response: None,
            source: SOURCE,
            endpoint,
            timestamp: Utc::now(),
        }
    }

    fn write(endpoint: String, response: Value) -> Self {
        Self {
            success: true,
            data: None,
            response: Some(response),
            source: SOURCE,
            endpoint,
            timestamp: Utc::now(),
        }
    }
}

/// `GET /api/data/{endpoint}`
///
/// The incoming query string is forwarded unchanged.
pub async fn get_data(
    State(state): State<AppState>,
    Path(endpoint): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<ProxyResponse>, ApiError> {
    forward_get(&state, endpoint, query.as_deref()).await
}

/// `POST /api/data/{endpoint}`
///
/// A body that is not JSON is answered with a `bad_request` error.
pub async fn post_data(
    State(state): State<AppState>,
    Path(endpoint): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ProxyResponse>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let response = state.engine.send_data(&endpoint, &payload).await?;
    Ok(Json(ProxyResponse::write(endpoint, response)))
}

/// `GET /api/sensors`
pub async fn sensors(State(state): State<AppState>) -> Result<Json<ProxyResponse>, ApiError> {
    forward_get(&state, "sensors".to_string(), None).await
}

/// `GET /api/devices`
pub async fn devices(State(state): State<AppState>) -> Result<Json<ProxyResponse>, ApiError> {
    forward_get(&state, "devices".to_string(), None).await
}

async fn forward_get(
    state: &AppState,
    endpoint: String,
    query: Option<&str>,
) -> Result<Json<ProxyResponse>, ApiError> {
    let data = state.engine.get_data(&endpoint, query).await?;
    Ok(Json(ProxyResponse::read(endpoint, data)))
}
