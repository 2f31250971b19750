//! Common error types for flowlight.
//!
//! This module provides the malformed-input errors raised while decoding
//! flow definition files and notification payloads.

use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core errors raised while decoding external input.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The notification body was empty.
    #[error("empty notification body")]
    EmptyPayload,

    /// The notification body is not well-formed XML.
    #[error("invalid XML: {0}")]
    InvalidXml(String),

    /// A required XML element is absent.
    #[error("missing element: <{0}>")]
    MissingElement(&'static str),

    /// A flow definition document could not be decoded.
    #[error("invalid flow definition: {0}")]
    InvalidFlows(String),
}
