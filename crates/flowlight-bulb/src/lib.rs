//! Smart bulb control for flowlight.
//!
//! This crate provides the [`BulbDriver`] trait, a [`TuyaBulb`] driver for
//! Tuya colour bulbs on the local network, and the [`Dispatcher`] that
//! serializes device work behind a bounded queue.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  submit   ┌──────────────┐  set_color   ┌──────────────┐
//! │   Handlers   │ ────────► │  Dispatcher  │ ───────────► │  BulbDriver  │
//! │ (many tasks) │ try_send  │ (one worker) │  turn_off    │  (TuyaBulb)  │
//! └──────────────┘           └──────────────┘              └──────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use flowlight_bulb::{DeviceCommand, DispatchTimings, Dispatcher, TuyaBulb, TuyaConfig};
//! use flowlight_core::BulbColor;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TuyaConfig::new("bf0123456789abcdef", "192.168.1.50", "0123456789abcdef");
//! let bulb = TuyaBulb::connect(config).await?;
//!
//! let (dispatcher, worker) = Dispatcher::spawn(Arc::new(bulb), DispatchTimings::default());
//! dispatcher.submit(DeviceCommand::Show(BulbColor::Green))?;
//!
//! drop(dispatcher);
//! worker.await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod tuya;

#[cfg(any(test, feature = "test-utils"))]
pub mod recording;

pub use config::{DispatchTimings, TuyaConfig, DEFAULT_ACK_TIMEOUT, DEFAULT_PORT};
pub use dispatch::{join_worker, DeviceCommand, Dispatcher, QUEUE_CAPACITY};
pub use driver::BulbDriver;
pub use error::{BulbError, Result};
pub use tuya::TuyaBulb;

#[cfg(any(test, feature = "test-utils"))]
pub use recording::{BulbAction, RecordingBulb};
