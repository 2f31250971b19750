//! Gateway application state.
//!
//! This module defines the shared state that is available to all request handlers.

use std::sync::Arc;

use flowlight_bulb::{BulbError, DeviceCommand, Dispatcher};
use flowlight_engine::EngineClient;

use crate::config::GatewayConfig;
use crate::error::ApiError;

/// Shared application state for the gateway.
///
/// This struct holds references to all services needed by the HTTP handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Client for the automation engine.
    pub engine: Arc<EngineClient>,
    /// Bulb command queue; `None` when no device is configured or it could
    /// not be reached at startup.
    pub device: Option<Dispatcher>,
    /// Gateway configuration.
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(engine: EngineClient, device: Option<Dispatcher>, config: GatewayConfig) -> Self {
        Self {
            engine: Arc::new(engine),
            device,
            config: Arc::new(config),
        }
    }

    /// Whether a bulb is available.
    #[must_use]
    pub fn device_ready(&self) -> bool {
        self.device.is_some()
    }

    /// Queue a device command without waiting for it.
    ///
    /// A full queue drops the command; the caller still gets `Ok`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::DeviceUnavailable`] when there is no device or its
    /// worker has stopped.
    pub fn dispatch(&self, command: DeviceCommand) -> Result<(), ApiError> {
        let device = self.device.as_ref().ok_or(ApiError::DeviceUnavailable)?;
        match device.submit(command) {
            Ok(()) | Err(BulbError::QueueFull) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
