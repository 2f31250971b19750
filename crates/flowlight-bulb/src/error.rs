//! Error types for the bulb crate.

use thiserror::Error;

/// Errors that can occur while driving the bulb.
#[derive(Error, Debug)]
pub enum BulbError {
    /// Socket error talking to the device.
    #[error("device I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The device sent something that is not a valid frame.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The device did not acknowledge a command in time.
    #[error("device did not answer within {0:?}")]
    Timeout(std::time::Duration),

    /// The device answered with a non-zero return code.
    #[error("device rejected command with return code {0}")]
    Rejected(u32),

    /// The local key is not a valid AES-128 key.
    #[error("local key must be 16 bytes, got {0}")]
    InvalidKey(usize),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The dispatch queue is full; the command was dropped.
    #[error("device command queue is full")]
    QueueFull,

    /// The dispatch worker has stopped.
    #[error("device command queue is closed")]
    QueueClosed,
}

impl BulbError {
    /// Check if this error is worth a reconnect-and-retry.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Protocol(_) | Self::Timeout(_))
    }
}

/// A specialized Result type for bulb operations.
pub type Result<T> = std::result::Result<T, BulbError>;
