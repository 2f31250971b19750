//! Engine connection status reported by health checks.

use serde::{Deserialize, Serialize};

/// Outcome of a connection check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// The engine answered `GET /` with a success status.
    Connected,
    /// The engine could not be reached.
    Disconnected,
    /// The engine answered with an error, or the check itself failed.
    Error,
}

/// Result of [`EngineClient::check_connection`](crate::EngineClient::check_connection).
///
/// Recomputed on every check; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// Connection state.
    pub status: ConnectionState,
    /// Human-readable description.
    pub message: String,
    /// The engine base URL that was checked.
    pub url: String,
}

impl ConnectionStatus {
    /// The engine is reachable.
    #[must_use]
    pub fn connected(url: impl Into<String>) -> Self {
        Self {
            status: ConnectionState::Connected,
            message: "Node-RED is reachable".to_string(),
            url: url.into(),
        }
    }

    /// The engine could not be reached.
    #[must_use]
    pub fn disconnected(url: impl Into<String>) -> Self {
        Self {
            status: ConnectionState::Disconnected,
            message: "Cannot connect to Node-RED".to_string(),
            url: url.into(),
        }
    }

    /// The engine answered with an error or the check failed.
    #[must_use]
    pub fn error(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: ConnectionState::Error,
            message: message.into(),
            url: url.into(),
        }
    }

    /// Whether the engine is reachable.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.status == ConnectionState::Connected
    }
}
