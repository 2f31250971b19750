//! Error types for the engine client.
//!
//! Transport failures are split into "the engine could not be reached" and
//! "the engine answered with a non-success status" so that callers can map
//! them to distinct outcomes.

use flowlight_core::CoreError;
use thiserror::Error;

/// A result type using `EngineError`.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while talking to the automation engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The connection was refused or timed out.
    #[error("engine unreachable at {url}: {message}")]
    Unreachable {
        /// The URL that was requested.
        url: String,
        /// Transport error description.
        message: String,
    },

    /// The engine answered with a non-success status.
    #[error("engine returned HTTP {status} for {url}: {body}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// Any other transport failure (invalid URL, broken body, redirect loop).
    #[error("engine request failed: {0}")]
    Request(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// The engine answered successfully but the body could not be decoded.
    #[error("invalid engine response: {0}")]
    Decode(#[from] CoreError),
}

impl EngineError {
    /// Classify a reqwest error for the given URL.
    #[must_use]
    pub fn from_transport(url: &str, err: &reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::Unreachable {
                url: url.to_string(),
                message: err.to_string(),
            }
        } else {
            Self::Request(err.to_string())
        }
    }

    /// Returns true if the engine itself caused the failure (unreachable or
    /// an error status), as opposed to a local problem.
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        matches!(self, Self::Unreachable { .. } | Self::Http { .. })
    }

    /// Returns the HTTP status a gateway should answer with.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Unreachable { .. } | Self::Http { .. } => 502,
            Self::Request(_) | Self::ClientBuild(_) | Self::Decode(_) => 500,
        }
    }
}
