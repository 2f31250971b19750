//! Core types and utilities for flowlight.
//!
//! This crate provides the foundational types shared by the importer and the
//! gateway:
//!
//! - **Colours**: the single-letter code to bulb colour mapping
//! - **Flows**: the flow definition model understood by the automation engine
//! - **Notifications**: decoding of the legacy XML notification payload
//! - **Error types**: malformed-input errors shared across crates
//!
//! # Example
//!
//! ```
//! use flowlight_core::{BulbColor, Notification};
//!
//! let notification = Notification::from_xml("<Event><UserString>a</UserString></Event>").unwrap();
//! assert_eq!(notification.color(), BulbColor::Green);
//! assert_eq!(BulbColor::from_code("R"), BulbColor::White);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod color;
pub mod error;
pub mod flow;
pub mod notification;

pub use color::{BulbColor, ColorCommand};
pub use error::{CoreError, Result};
pub use flow::{FlowNode, FlowSet, TAB_NODE_TYPE};
pub use notification::Notification;
