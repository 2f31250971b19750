//! Importer configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Label of the tab that marks the flows as installed.
pub const DEFAULT_TAB_LABEL: &str = "API Endpoints";

/// Endpoints probed after an import.
pub const DEFAULT_VERIFY_ENDPOINTS: [&str; 3] = ["/sensors", "/devices", "/status"];

/// Endpoints announced once the flows are live.
pub const PUBLISHED_ENDPOINTS: [&str; 5] = [
    "/sensors",
    "/devices",
    "/status",
    "/data",
    "/control (POST)",
];

/// Settings for one import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    /// Engine base URL.
    pub node_red_url: String,
    /// Flow definition file to install.
    pub flows_file: PathBuf,
    /// Tab label whose presence means "already installed".
    pub tab_label: String,
    /// Readiness probes before giving up.
    pub max_attempts: u32,
    /// Pause between failed readiness probes.
    pub retry_interval: Duration,
    /// Timeout of a single readiness probe or verification request.
    pub attempt_timeout: Duration,
    /// Pause between deploy and verification.
    pub settle_delay: Duration,
    /// Engine paths that must answer 2xx after the import.
    pub verify_endpoints: Vec<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            node_red_url: "http://localhost:1880".to_string(),
            flows_file: PathBuf::from("flows.json"),
            tab_label: DEFAULT_TAB_LABEL.to_string(),
            max_attempts: 30,
            retry_interval: Duration::from_secs(5),
            attempt_timeout: Duration::from_secs(5),
            settle_delay: Duration::from_secs(3),
            verify_endpoints: DEFAULT_VERIFY_ENDPOINTS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ImportConfig::default();
        assert_eq!(config.node_red_url, "http://localhost:1880");
        assert_eq!(config.flows_file, PathBuf::from("flows.json"));
        assert_eq!(config.tab_label, "API Endpoints");
        assert_eq!(config.max_attempts, 30);
        assert_eq!(config.retry_interval, Duration::from_secs(5));
        assert_eq!(config.attempt_timeout, Duration::from_secs(5));
        assert_eq!(config.settle_delay, Duration::from_secs(3));
        assert_eq!(config.verify_endpoints, vec!["/sensors", "/devices", "/status"]);
    }
}
