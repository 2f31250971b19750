//! Error types and process exit statuses for the importer.

use std::path::PathBuf;

use thiserror::Error;

use flowlight_engine::EngineError;

use crate::report::VerificationReport;

/// A specialized Result type for import runs.
pub type Result<T> = std::result::Result<T, ImportError>;

/// Terminal failures of an import run.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The engine never answered the readiness probe.
    #[error("Node-RED did not become ready after {attempts} attempts")]
    EngineNotReady {
        /// Probes made.
        attempts: u32,
    },

    /// The flow definition file does not exist.
    #[error("flows file not found: {}", path.display())]
    FlowsFileMissing {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The flow definition file exists but could not be read.
    #[error("failed to read flows file {}: {source}", path.display())]
    FlowsFileRead {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The flow definition file is not a JSON array of nodes.
    #[error("invalid flows file {}: {reason}", path.display())]
    InvalidFlowsFile {
        /// Path that was read.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// The flow definition file holds no nodes.
    #[error("flows file {} contains no flows", path.display())]
    EmptyFlows {
        /// Path that was read.
        path: PathBuf,
    },

    /// The engine rejected the flow upload.
    #[error("failed to import flows: {0}")]
    Install(#[source] EngineError),

    /// The engine rejected the deploy.
    #[error("failed to deploy flows: {0}")]
    Deploy(#[source] EngineError),

    /// Some endpoints did not work after the import.
    #[error("endpoint verification failed: {0}")]
    VerificationFailed(VerificationReport),

    /// The HTTP client could not be constructed.
    #[error("HTTP client unavailable: {0}")]
    Client(#[source] EngineError),
}

impl ImportError {
    /// The process exit status for this failure.
    #[must_use]
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            Self::Client(_) => ExitStatus::MissingDependency,
            _ => ExitStatus::Failure,
        }
    }
}

/// Process exit statuses of the importer binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Flows installed (or already present) and verified.
    Success,
    /// A step failed.
    Failure,
    /// Interrupted by Ctrl-C.
    Interrupted,
    /// The run aborted unexpectedly.
    Unexpected,
    /// A required component could not be initialised.
    MissingDependency,
}

impl ExitStatus {
    /// Numeric process exit code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Interrupted => 2,
            Self::Unexpected => 3,
            Self::MissingDependency => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(ExitStatus::Success.code(), 0);
        assert_eq!(ExitStatus::Failure.code(), 1);
        assert_eq!(ExitStatus::Interrupted.code(), 2);
        assert_eq!(ExitStatus::Unexpected.code(), 3);
        assert_eq!(ExitStatus::MissingDependency.code(), 4);
    }

    #[test]
    fn error_exit_status() {
        let err = ImportError::EngineNotReady { attempts: 30 };
        assert_eq!(err.exit_status(), ExitStatus::Failure);
        assert_eq!(err.to_string(), "Node-RED did not become ready after 30 attempts");

        let err = ImportError::Client(EngineError::ClientBuild("no tls backend".into()));
        assert_eq!(err.exit_status(), ExitStatus::MissingDependency);

        let err = ImportError::FlowsFileMissing {
            path: PathBuf::from("flows.json"),
        };
        assert_eq!(err.to_string(), "flows file not found: flows.json");
    }
}
