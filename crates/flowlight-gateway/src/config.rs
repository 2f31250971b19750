//! Gateway configuration.
//!
//! Everything is read from environment variables, each with a default.
//! [`GatewayConfig::from_lookup`] takes the variable source as a function so
//! tests do not have to touch the process environment.

use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use flowlight_bulb::{DispatchTimings, TuyaConfig, DEFAULT_PORT};

/// Errors raised while reading the configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but its value is not acceptable.
    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Some but not all device variables are set.
    #[error("incomplete device configuration, missing {}", missing.join(", "))]
    IncompleteDevice {
        /// Variables that are unset.
        missing: Vec<&'static str>,
    },
}

/// Configuration for the gateway service.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Engine base URL (`NODE_RED_URL`).
    pub node_red_url: String,
    /// Engine request timeout (`NODE_RED_TIMEOUT`, seconds).
    pub node_red_timeout: Duration,
    /// Bind host (`API_HOST`).
    pub api_host: String,
    /// Bind port (`API_PORT`).
    pub api_port: u16,
    /// Allowed CORS origins (`CORS_ORIGINS`, comma separated, `*` for any).
    pub cors_origins: Vec<String>,
    /// Only this peer may post notifications (`NOTIFY_ALLOWED_IP`).
    pub notify_allowed_ip: Option<IpAddr>,
    /// Debug logging for the workspace crates (`DEBUG`).
    pub debug: bool,
    /// Base log level (`LOG_LEVEL`).
    pub log_level: String,
    /// Bulb connection, when all `TUYA_*` variables are set.
    pub tuya: Option<TuyaConfig>,
    /// Blink and test-sequence delays (`BLINK_FLASH_MS`, `TEST_STEP_MS`).
    pub dispatch: DispatchTimings,
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
    /// Whole-request timeout.
    pub request_timeout: Duration,
    /// How long shutdown waits for the device worker (`SHUTDOWN_GRACE_SECS`).
    pub shutdown_grace: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            node_red_url: "http://localhost:1880".to_string(),
            node_red_timeout: Duration::from_secs(30),
            api_host: "0.0.0.0".to_string(),
            api_port: 8000,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://localhost:3001".to_string(),
            ],
            notify_allowed_ip: None,
            debug: true,
            log_level: "info".to_string(),
            tuya: None,
            dispatch: DispatchTimings::default(),
            max_body_bytes: 1024 * 1024, // 1 MB
            request_timeout: Duration::from_secs(60),
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

impl GatewayConfig {
    /// Read the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`GatewayConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration from `lookup`.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for values that do not parse or are
    /// out of range, and [`ConfigError::IncompleteDevice`] when only part of
    /// the device credentials is given.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let node_red_url = get("NODE_RED_URL").unwrap_or(defaults.node_red_url);

        let timeout_secs: u64 = parse(&get, "NODE_RED_TIMEOUT", 30)?;
        if timeout_secs == 0 {
            return Err(invalid("NODE_RED_TIMEOUT", "0", "must be positive"));
        }

        let api_port: u16 = parse(&get, "API_PORT", defaults.api_port)?;
        if api_port == 0 {
            return Err(invalid("API_PORT", "0", "must be between 1 and 65535"));
        }

        let cors_origins = get("CORS_ORIGINS").map_or(defaults.cors_origins, |raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(ToString::to_string)
                .collect()
        });

        let notify_allowed_ip = match get("NOTIFY_ALLOWED_IP") {
            Some(raw) => Some(
                raw.trim()
                    .parse()
                    .map_err(|e: std::net::AddrParseError| {
                        invalid("NOTIFY_ALLOWED_IP", &raw, &e.to_string())
                    })?,
            ),
            None => None,
        };

        let debug = match get("DEBUG") {
            Some(raw) => parse_bool("DEBUG", &raw)?,
            None => defaults.debug,
        };

        let grace_secs: u64 = parse(&get, "SHUTDOWN_GRACE_SECS", 5)?;
        if grace_secs == 0 {
            return Err(invalid("SHUTDOWN_GRACE_SECS", "0", "must be positive"));
        }

        let dispatch = DispatchTimings {
            blink_flash: Duration::from_millis(parse(&get, "BLINK_FLASH_MS", 400)?),
            test_step: Duration::from_millis(parse(&get, "TEST_STEP_MS", 1000)?),
        };

        Ok(Self {
            node_red_url,
            node_red_timeout: Duration::from_secs(timeout_secs),
            api_host: get("API_HOST").unwrap_or(defaults.api_host),
            api_port,
            cors_origins,
            notify_allowed_ip,
            debug,
            log_level: get("LOG_LEVEL")
                .map_or(defaults.log_level, |level| level.trim().to_ascii_lowercase()),
            tuya: device_config(&get)?,
            dispatch,
            shutdown_grace: Duration::from_secs(grace_secs),
            ..defaults
        })
    }

    /// `host:port` to bind.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    /// Default tracing filter when `RUST_LOG` is not set.
    #[must_use]
    pub fn log_filter(&self) -> String {
        if self.debug {
            format!("{},flowlight=debug", self.log_level)
        } else {
            self.log_level.clone()
        }
    }
}

const DEVICE_VARS: [&str; 3] = ["TUYA_DEVICE_ID", "TUYA_DEVICE_IP", "TUYA_LOCAL_KEY"];

fn device_config<G>(get: &G) -> Result<Option<TuyaConfig>, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let [id, ip, key] = DEVICE_VARS.map(get);

    let (id, ip, key) = match (id, ip, key) {
        (Some(id), Some(ip), Some(key)) => (id, ip, key),
        (None, None, None) => return Ok(None),
        (id, ip, key) => {
            let missing = DEVICE_VARS
                .iter()
                .zip([id.is_none(), ip.is_none(), key.is_none()])
                .filter_map(|(var, absent)| absent.then_some(*var))
                .collect();
            return Err(ConfigError::IncompleteDevice { missing });
        }
    };

    let port = parse(get, "TUYA_DEVICE_PORT", DEFAULT_PORT)?;
    let ack_ms: u64 = parse(get, "TUYA_ACK_TIMEOUT_MS", 5000)?;
    if ack_ms == 0 {
        return Err(invalid("TUYA_ACK_TIMEOUT_MS", "0", "must be positive"));
    }
    let config = TuyaConfig::new(id.trim(), ip.trim(), key)
        .with_port(port)
        .with_ack_timeout(Duration::from_millis(ack_ms));
    config
        .validate()
        .map_err(|e| invalid("TUYA_LOCAL_KEY", "<redacted>", &e.to_string()))?;
    Ok(Some(config))
}

fn parse<G, T>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(var) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(var, &raw, &e.to_string())),
        None => Ok(default),
    }
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(invalid(var, raw, "expected true or false")),
    }
}

fn invalid(var: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.node_red_url, "http://localhost:1880");
        assert_eq!(config.node_red_timeout, Duration::from_secs(30));
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert_eq!(config.cors_origins.len(), 3);
        assert!(config.notify_allowed_ip.is_none());
        assert!(config.debug);
        assert!(config.tuya.is_none());
        assert_eq!(config.dispatch, DispatchTimings::default());
        assert_eq!(config.log_filter(), "info,flowlight=debug");
        assert_eq!(config.shutdown_grace, Duration::from_secs(5));
    }

    #[test]
    fn overrides() {
        let config = from_pairs(&[
            ("NODE_RED_URL", "http://engine:1880"),
            ("NODE_RED_TIMEOUT", "5"),
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "9000"),
            ("CORS_ORIGINS", "https://a.example, https://b.example,"),
            ("NOTIFY_ALLOWED_IP", "192.168.1.20"),
            ("DEBUG", "False"),
            ("LOG_LEVEL", "WARN"),
            ("BLINK_FLASH_MS", "100"),
            ("TEST_STEP_MS", "250"),
            ("SHUTDOWN_GRACE_SECS", "2"),
        ])
        .unwrap();

        assert_eq!(config.node_red_url, "http://engine:1880");
        assert_eq!(config.node_red_timeout, Duration::from_secs(5));
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.cors_origins, vec!["https://a.example", "https://b.example"]);
        assert_eq!(
            config.notify_allowed_ip,
            Some("192.168.1.20".parse().unwrap())
        );
        assert_eq!(config.log_filter(), "warn");
        assert_eq!(config.dispatch.blink_flash, Duration::from_millis(100));
        assert_eq!(config.dispatch.test_step, Duration::from_millis(250));
        assert_eq!(config.shutdown_grace, Duration::from_secs(2));
    }

    #[test]
    fn invalid_values() {
        assert!(matches!(
            from_pairs(&[("NODE_RED_TIMEOUT", "0")]),
            Err(ConfigError::Invalid { var: "NODE_RED_TIMEOUT", .. })
        ));
        assert!(matches!(
            from_pairs(&[("API_PORT", "70000")]),
            Err(ConfigError::Invalid { var: "API_PORT", .. })
        ));
        assert!(matches!(
            from_pairs(&[("API_PORT", "0")]),
            Err(ConfigError::Invalid { var: "API_PORT", .. })
        ));
        assert!(matches!(
            from_pairs(&[("NOTIFY_ALLOWED_IP", "not-an-ip")]),
            Err(ConfigError::Invalid { var: "NOTIFY_ALLOWED_IP", .. })
        ));
        assert!(matches!(
            from_pairs(&[("SHUTDOWN_GRACE_SECS", "0")]),
            Err(ConfigError::Invalid { var: "SHUTDOWN_GRACE_SECS", .. })
        ));
        assert!(matches!(
            from_pairs(&[("DEBUG", "maybe")]),
            Err(ConfigError::Invalid { var: "DEBUG", .. })
        ));
    }

    #[test]
    fn device_section() {
        let config = from_pairs(&[
            ("TUYA_DEVICE_ID", "bf123"),
            ("TUYA_DEVICE_IP", "192.168.1.50"),
            ("TUYA_LOCAL_KEY", "0123456789abcdef"),
        ])
        .unwrap();
        let tuya = config.tuya.unwrap();
        assert_eq!(tuya.address(), "192.168.1.50:6668");
        assert_eq!(tuya.ack_timeout, Duration::from_secs(5));

        let config = from_pairs(&[
            ("TUYA_DEVICE_ID", "bf123"),
            ("TUYA_DEVICE_IP", "192.168.1.50"),
            ("TUYA_LOCAL_KEY", "0123456789abcdef"),
            ("TUYA_ACK_TIMEOUT_MS", "750"),
        ])
        .unwrap();
        assert_eq!(config.tuya.unwrap().ack_timeout, Duration::from_millis(750));

        let err = from_pairs(&[
            ("TUYA_DEVICE_ID", "bf123"),
            ("TUYA_DEVICE_IP", "192.168.1.50"),
            ("TUYA_LOCAL_KEY", "0123456789abcdef"),
            ("TUYA_ACK_TIMEOUT_MS", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "TUYA_ACK_TIMEOUT_MS", .. }));

        let err = from_pairs(&[("TUYA_DEVICE_ID", "bf123")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::IncompleteDevice {
                missing: vec!["TUYA_DEVICE_IP", "TUYA_LOCAL_KEY"]
            }
        );

        let err = from_pairs(&[
            ("TUYA_DEVICE_ID", "bf123"),
            ("TUYA_DEVICE_IP", "192.168.1.50"),
            ("TUYA_LOCAL_KEY", "short"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "TUYA_LOCAL_KEY", .. }));
        assert!(!err.to_string().contains("short"));
    }

    #[test]
    fn empty_values_are_unset() {
        let config = from_pairs(&[("NODE_RED_URL", ""), ("NOTIFY_ALLOWED_IP", "  ")]).unwrap();
        assert_eq!(config.node_red_url, "http://localhost:1880");
        assert!(config.notify_allowed_ip.is_none());
    }
}
