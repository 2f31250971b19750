//! REST client for the Node-RED automation engine.
//!
//! This crate wraps the engine's HTTP surface for the rest of flowlight:
//!
//! - Forwarding of GET/POST/PUT/DELETE calls with tolerant body decoding
//! - Connection checks for health endpoints
//! - Flow administration (list, install, deploy) for the importer
//!
//! # Usage
//!
//! ```no_run
//! use flowlight_engine::{EngineClient, DEFAULT_TIMEOUT};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = EngineClient::new("http://localhost:1880", DEFAULT_TIMEOUT)?;
//!
//! let status = client.check_connection().await;
//! println!("engine: {:?}", status.status);
//!
//! let sensors = client.get_data("sensors", None).await?;
//! println!("sensors: {sensors}");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod error;
pub mod status;

pub use client::{EngineClient, DEFAULT_TIMEOUT};
pub use error::{EngineError, Result};
pub use status::{ConnectionState, ConnectionStatus};
