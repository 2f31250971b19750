//! Legacy XML notification endpoint.
//!
//! Alarm panels post an XML document whose `<UserString>` holds a colour
//! code. The colour is queued for the bulb and the handler answers at once.

use std::net::SocketAddr;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use flowlight_bulb::DeviceCommand;
use flowlight_core::{BulbColor, Notification};

use crate::connect_info::MaybeConnectInfo;
use crate::error::ApiError;
use crate::state::AppState;

/// Accepted notification response.
#[derive(Debug, Serialize)]
pub struct NotifyResponse {
    /// Always `true`.
    pub ok: bool,
    /// Normalised colour code.
    pub code: String,
    /// Colour that was queued.
    pub color: BulbColor,
    /// `<UserString>` as received, trimmed.
    pub user_string: String,
    /// When the notification was accepted.
    pub timestamp: DateTime<Utc>,
}

/// `POST /api/notify`
///
/// Checked in order: caller allow-list (403), body (400 when empty, not
/// XML, or without `<UserString>`), device presence (503).
pub async fn notify(
    State(state): State<AppState>,
    MaybeConnectInfo(peer): MaybeConnectInfo,
    body: String,
) -> Result<Json<NotifyResponse>, ApiError> {
    check_caller(&state, peer)?;

    let notification = Notification::from_xml(&body).inspect_err(|e| {
        tracing::warn!(error = %e, "Rejected notification body");
    })?;
    let command = notification.command();

    state.dispatch(DeviceCommand::Show(command.color))?;
    tracing::info!(
        code = %command.code,
        color = %command.color,
        peer = ?peer,
        "Notification accepted"
    );

    Ok(Json(NotifyResponse {
        ok: true,
        code: command.code,
        color: command.color,
        user_string: notification.user_string,
        timestamp: Utc::now(),
    }))
}

/// Enforce `NOTIFY_ALLOWED_IP`. An unknown peer is refused.
fn check_caller(state: &AppState, peer: Option<SocketAddr>) -> Result<(), ApiError> {
    let Some(allowed) = state.config.notify_allowed_ip else {
        return Ok(());
    };

    match peer {
        Some(addr) if addr.ip().to_canonical() == allowed.to_canonical() => Ok(()),
        _ => {
            tracing::warn!(peer = ?peer, allowed = %allowed, "Notification from disallowed caller");
            Err(ApiError::Forbidden)
        }
    }
}
