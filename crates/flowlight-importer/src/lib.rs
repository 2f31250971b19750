//! Flow definition importer for flowlight.
//!
//! Waits for the Node-RED engine to come up, installs the flow definition
//! file unless the flows are already present and working, deploys it and
//! verifies that the published endpoints answer.
//!
//! # Example
//!
//! ```no_run
//! use flowlight_importer::{FlowImporter, ImportConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let importer = FlowImporter::new(ImportConfig::default())?;
//! let outcome = importer.run().await?;
//! println!("{}", outcome.report());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod importer;
pub mod report;

pub use config::{ImportConfig, DEFAULT_TAB_LABEL, DEFAULT_VERIFY_ENDPOINTS, PUBLISHED_ENDPOINTS};
pub use error::{ExitStatus, ImportError, Result};
pub use importer::{FlowImporter, ImportOutcome};
pub use report::{CheckOutcome, EndpointCheck, VerificationReport};
