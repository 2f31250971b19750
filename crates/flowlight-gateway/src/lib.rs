//! HTTP gateway for flowlight.
//!
//! The gateway sits between browsers, alarm panels and the Node-RED
//! automation engine. It handles:
//!
//! - Forwarding data reads and writes to the engine
//! - Reporting engine and device health
//! - Turning legacy XML notifications into bulb colours
//! - Direct colour and test-sequence commands for the bulb
//!
//! # Architecture
//!
//! ```text
//!   Browsers / alarm panels
//!              │
//!              ▼
//! ┌─────────────────────────────┐
//! │      flowlight-gateway      │
//! │   Router + Handlers + CORS  │
//! └─────────────────────────────┘
//!         │               │
//!         ▼               ▼
//!   ┌──────────┐   ┌─────────────┐
//!   │ Node-RED │   │ Dispatcher  │──▶ Tuya bulb
//!   └──────────┘   └─────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use flowlight_engine::EngineClient;
//! use flowlight_gateway::{create_router, AppState, GatewayConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig::from_env()?;
//! let engine = EngineClient::new(&config.node_red_url, config.node_red_timeout)?;
//!
//! // No bulb: notification routes answer 503.
//! let state = AppState::new(engine, None, config);
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod connect_info;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{ConfigError, GatewayConfig};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
