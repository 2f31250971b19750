//! Device and dispatch configuration.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use crate::{BulbError, Result};

/// Default TCP port of the Tuya local protocol.
pub const DEFAULT_PORT: u16 = 6668;

/// How long to wait for the device to acknowledge a command.
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(5);

/// Length of a Tuya local key in bytes.
pub const LOCAL_KEY_LEN: usize = 16;

/// Connection settings for a Tuya bulb on the local network.
#[derive(Clone, PartialEq, Eq)]
pub struct TuyaConfig {
    /// Device identifier, also sent as `devId` and `uid`.
    pub device_id: String,
    /// Device IP address or host name.
    pub host: String,
    /// Device TCP port.
    pub port: u16,
    /// AES-128 local key as a 16-character string.
    pub local_key: String,
    /// Wait for a command acknowledgement before dropping the connection.
    pub ack_timeout: Duration,
}

impl TuyaConfig {
    /// Create a config using the default port.
    #[must_use]
    pub fn new(
        device_id: impl Into<String>,
        host: impl Into<String>,
        local_key: impl Into<String>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            host: host.into(),
            port: DEFAULT_PORT,
            local_key: local_key.into(),
            ack_timeout: DEFAULT_ACK_TIMEOUT,
        }
    }

    /// Override the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Override the acknowledgement timeout.
    #[must_use]
    pub fn with_ack_timeout(mut self, ack_timeout: Duration) -> Self {
        self.ack_timeout = ack_timeout;
        self
    }

    /// `host:port` for connecting.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parse the address as a socket address, if the host is an IP literal.
    #[must_use]
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.address().parse().ok()
    }

    /// Validate the config.
    ///
    /// # Errors
    ///
    /// Returns [`BulbError::Config`] for empty fields and
    /// [`BulbError::InvalidKey`] when the key is not 16 bytes.
    pub fn validate(&self) -> Result<()> {
        if self.device_id.trim().is_empty() {
            return Err(BulbError::Config("device id is empty".to_string()));
        }
        if self.host.trim().is_empty() {
            return Err(BulbError::Config("device host is empty".to_string()));
        }
        if self.ack_timeout.is_zero() {
            return Err(BulbError::Config("ack timeout must be positive".to_string()));
        }
        if self.local_key.len() != LOCAL_KEY_LEN {
            return Err(BulbError::InvalidKey(self.local_key.len()));
        }
        Ok(())
    }
}

impl fmt::Debug for TuyaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TuyaConfig")
            .field("device_id", &self.device_id)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("local_key", &"<redacted>")
            .field("ack_timeout", &self.ack_timeout)
            .finish()
    }
}

/// Delays used when playing colour patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchTimings {
    /// How long each half of a blink lasts.
    pub blink_flash: Duration,
    /// How long each colour of the test sequence is shown.
    pub test_step: Duration,
}

impl Default for DispatchTimings {
    fn default() -> Self {
        Self {
            blink_flash: Duration::from_millis(400),
            test_step: Duration::from_millis(1000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TuyaConfig {
        TuyaConfig::new("bf123", "192.168.1.50", "0123456789abcdef")
    }

    #[test]
    fn defaults() {
        let c = config();
        assert_eq!(c.port, DEFAULT_PORT);
        assert_eq!(c.address(), "192.168.1.50:6668");
        assert!(c.socket_addr().is_some());
        assert_eq!(c.ack_timeout, DEFAULT_ACK_TIMEOUT);
        assert!(c.validate().is_ok());

        let t = DispatchTimings::default();
        assert_eq!(t.blink_flash, Duration::from_millis(400));
        assert_eq!(t.test_step, Duration::from_secs(1));
    }

    #[test]
    fn hostname_has_no_socket_addr() {
        let c = TuyaConfig::new("bf123", "bulb.local", "0123456789abcdef").with_port(7000);
        assert_eq!(c.address(), "bulb.local:7000");
        assert!(c.socket_addr().is_none());
    }

    #[test]
    fn validation() {
        let mut c = config();
        c.local_key = "short".into();
        assert!(matches!(c.validate(), Err(BulbError::InvalidKey(5))));

        let mut c = config();
        c.device_id = " ".into();
        assert!(matches!(c.validate(), Err(BulbError::Config(_))));

        let mut c = config();
        c.host = String::new();
        assert!(matches!(c.validate(), Err(BulbError::Config(_))));

        let c = config().with_ack_timeout(Duration::ZERO);
        assert!(matches!(c.validate(), Err(BulbError::Config(_))));
    }

    #[test]
    fn debug_hides_key() {
        let rendered = format!("{:?}", config());
        assert!(rendered.contains("bf123"));
        assert!(!rendered.contains("0123456789abcdef"));
    }
}
