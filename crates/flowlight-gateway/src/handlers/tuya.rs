//! Direct bulb control endpoints.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use flowlight_bulb::DeviceCommand;
use flowlight_core::{BulbColor, ColorCommand};

use crate::error::ApiError;
use crate::state::AppState;

/// Response to a colour code request.
#[derive(Debug, Serialize)]
pub struct CodeResponse {
    /// Always `true`.
    pub ok: bool,
    /// Normalised colour code.
    pub code: String,
    /// Colour that was queued.
    pub color: BulbColor,
    /// When the command was queued.
    pub timestamp: DateTime<Utc>,
}

/// Response to a test sequence request.
#[derive(Debug, Serialize)]
pub struct TestResponse {
    /// Always `true`.
    pub ok: bool,
    /// Colours that will be shown, in order.
    pub sequence: [BulbColor; 4],
    /// When the sequence was queued.
    pub timestamp: DateTime<Utc>,
}

/// `GET /api/tuya/code/{code}`
pub async fn show_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<CodeResponse>, ApiError> {
    let command = ColorCommand::from_code(&code);
    state.dispatch(DeviceCommand::Show(command.color))?;
    tracing::info!(code = %command.code, color = %command.color, "Colour queued");

    Ok(Json(CodeResponse {
        ok: true,
        code: command.code,
        color: command.color,
        timestamp: Utc::now(),
    }))
}

/// `GET /api/tuya/test`
pub async fn test_sequence(State(state): State<AppState>) -> Result<Json<TestResponse>, ApiError> {
    state.dispatch(DeviceCommand::TestSequence)?;
    tracing::info!("Test sequence queued");

    Ok(Json(TestResponse {
        ok: true,
        sequence: BulbColor::SEQUENCE,
        timestamp: Utc::now(),
    }))
}
