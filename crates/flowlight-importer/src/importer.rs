//! The import run.
//!
//! A run is strictly sequential:
//!
//! 1. wait for the engine to answer on `/`
//! 2. if the marker tab is already installed and every endpoint works, stop
//! 3. load the flow definition file
//! 4. upload it, then trigger a full deploy
//! 5. wait for the engine to settle and verify the endpoints

use std::io::ErrorKind;

use tokio::time::sleep;

use flowlight_core::FlowSet;
use flowlight_engine::{EngineClient, DEFAULT_TIMEOUT};

use crate::config::{ImportConfig, PUBLISHED_ENDPOINTS};
use crate::error::{ImportError, Result};
use crate::report::{CheckOutcome, EndpointCheck, VerificationReport};

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The flows were already installed and working; nothing was uploaded.
    AlreadyInstalled {
        /// Verification of the existing flows.
        report: VerificationReport,
    },
    /// The flows were uploaded, deployed and verified.
    Imported {
        /// Number of nodes uploaded.
        nodes: usize,
        /// Verification after the deploy.
        report: VerificationReport,
    },
}

impl ImportOutcome {
    /// The verification report of the run.
    #[must_use]
    pub fn report(&self) -> &VerificationReport {
        match self {
            Self::AlreadyInstalled { report } | Self::Imported { report, .. } => report,
        }
    }
}

/// Installs the flow definition into the engine.
#[derive(Debug, Clone)]
pub struct FlowImporter {
    client: EngineClient,
    config: ImportConfig,
}

impl FlowImporter {
    /// Create an importer with its own engine client.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Client`] if the HTTP client cannot be built.
    pub fn new(config: ImportConfig) -> Result<Self> {
        let client =
            EngineClient::new(&config.node_red_url, DEFAULT_TIMEOUT).map_err(ImportError::Client)?;
        Ok(Self::with_client(client, config))
    }

    /// Create an importer around an existing engine client.
    #[must_use]
    pub fn with_client(client: EngineClient, config: ImportConfig) -> Self {
        Self { client, config }
    }

    /// The run configuration.
    #[must_use]
    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Execute every step of the import.
    ///
    /// # Errors
    ///
    /// Returns the [`ImportError`] of the first step that failed.
    pub async fn run(&self) -> Result<ImportOutcome> {
        tracing::info!(
            node_red_url = %self.client.base_url(),
            flows_file = %self.config.flows_file.display(),
            "Starting flow import"
        );

        self.await_ready().await?;

        if self.flows_installed().await {
            tracing::info!(tab = %self.config.tab_label, "Flows already installed, verifying");
            let report = self.verify().await;
            if report.passed() {
                tracing::info!("All endpoints are working");
                return Ok(ImportOutcome::AlreadyInstalled { report });
            }
            tracing::warn!(%report, "Some endpoints not working, re-importing");
        }

        let flows = self.load_flows()?;
        self.client
            .install_flows(&flows)
            .await
            .map_err(ImportError::Install)?;
        tracing::info!(nodes = flows.len(), "Flows imported");

        self.client
            .deploy_flows()
            .await
            .map_err(ImportError::Deploy)?;
        tracing::info!("Flows deployed");

        tracing::info!(delay = ?self.config.settle_delay, "Waiting for flows to be processed");
        sleep(self.config.settle_delay).await;

        let report = self.verify().await;
        if !report.passed() {
            return Err(ImportError::VerificationFailed(report));
        }

        self.announce_endpoints();
        Ok(ImportOutcome::Imported {
            nodes: flows.len(),
            report,
        })
    }

    /// Probe the engine until it answers 2xx.
    ///
    /// Returns the attempt number that succeeded. There is no pause after
    /// the final attempt.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::EngineNotReady`] once `max_attempts` probes
    /// have failed.
    pub async fn await_ready(&self) -> Result<u32> {
        let max = self.config.max_attempts;
        tracing::info!(url = %self.client.base_url(), "Waiting for Node-RED");

        for attempt in 1..=max {
            match self.client.probe("/", self.config.attempt_timeout).await {
                Ok(status) if status.is_success() => {
                    tracing::info!(attempt, "Node-RED is ready");
                    return Ok(attempt);
                }
                Ok(status) => {
                    tracing::info!(attempt, max, status = status.as_u16(), "Node-RED not ready yet");
                }
                Err(e) => {
                    tracing::info!(attempt, max, error = %e, "Node-RED not ready yet");
                }
            }

            if attempt < max {
                sleep(self.config.retry_interval).await;
            }
        }

        tracing::error!(attempts = max, "Node-RED did not become ready");
        Err(ImportError::EngineNotReady { attempts: max })
    }

    /// Whether the marker tab is present in the installed flows.
    ///
    /// A listing that fails is treated as "not installed".
    pub async fn flows_installed(&self) -> bool {
        match self.client.fetch_flows().await {
            Ok(flows) => flows.has_tab(&self.config.tab_label),
            Err(e) => {
                tracing::warn!(error = %e, "Could not list current flows");
                false
            }
        }
    }

    /// Read and validate the flow definition file.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::FlowsFileMissing`], [`ImportError::FlowsFileRead`],
    /// [`ImportError::InvalidFlowsFile`] or [`ImportError::EmptyFlows`].
    pub fn load_flows(&self) -> Result<FlowSet> {
        let path = &self.config.flows_file;

        let flows = match FlowSet::read_file(path) {
            Ok(Ok(flows)) => flows,
            Ok(Err(e)) => {
                return Err(ImportError::InvalidFlowsFile {
                    path: path.clone(),
                    reason: e.to_string(),
                })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ImportError::FlowsFileMissing { path: path.clone() })
            }
            Err(source) => {
                return Err(ImportError::FlowsFileRead {
                    path: path.clone(),
                    source,
                })
            }
        };

        if flows.is_empty() {
            return Err(ImportError::EmptyFlows { path: path.clone() });
        }

        tracing::info!(
            path = %path.display(),
            nodes = flows.len(),
            tabs = flows.tabs().count(),
            "Loaded flows"
        );
        Ok(flows)
    }

    /// Probe every verification endpoint, including after a failure.
    pub async fn verify(&self) -> VerificationReport {
        tracing::info!("Verifying imported endpoints");
        let mut report = VerificationReport::default();

        for endpoint in &self.config.verify_endpoints {
            let outcome = match self.client.probe(endpoint, self.config.attempt_timeout).await {
                Ok(status) if status.is_success() => CheckOutcome::Working {
                    status: status.as_u16(),
                },
                Ok(status) => CheckOutcome::HttpStatus {
                    status: status.as_u16(),
                },
                Err(e) => CheckOutcome::Unreachable {
                    error: e.to_string(),
                },
            };

            let check = EndpointCheck {
                endpoint: endpoint.clone(),
                outcome,
            };
            if check.passed() {
                tracing::info!(%check, "Endpoint verified");
            } else {
                tracing::warn!(%check, "Endpoint failed verification");
            }
            report.checks.push(check);
        }

        report
    }

    fn announce_endpoints(&self) {
        tracing::info!("Available endpoints:");
        for endpoint in PUBLISHED_ENDPOINTS {
            tracing::info!("  {}{endpoint}", self.client.base_url());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn importer(flows_file: std::path::PathBuf) -> FlowImporter {
        let config = ImportConfig {
            flows_file,
            ..ImportConfig::default()
        };
        FlowImporter::new(config).unwrap()
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = importer(dir.path().join("nope.json")).load_flows().unwrap_err();
        assert!(matches!(err, ImportError::FlowsFileMissing { .. }));
    }

    #[test]
    fn load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"not": "an array"}}"#).unwrap();
        let err = importer(file.path().to_path_buf()).load_flows().unwrap_err();
        assert!(matches!(err, ImportError::InvalidFlowsFile { .. }));
    }

    #[test]
    fn load_empty_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();
        let err = importer(file.path().to_path_buf()).load_flows().unwrap_err();
        assert!(matches!(err, ImportError::EmptyFlows { .. }));
    }

    #[test]
    fn load_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "t1", "type": "tab", "label": "API Endpoints"}}, {{"id": "n1", "type": "http in", "z": "t1", "url": "/sensors"}}]"#
        )
        .unwrap();
        let flows = importer(file.path().to_path_buf()).load_flows().unwrap();
        assert_eq!(flows.len(), 2);
        assert!(flows.has_tab("API Endpoints"));
    }
}
