//! Flowlight flow importer.
//!
//! This is the entry point for the `flowlight-import` binary. Exit codes:
//! 0 success, 1 failure, 2 interrupted, 3 unexpected abort, 4 HTTP client
//! unavailable.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flowlight_importer::{ExitStatus, FlowImporter, ImportConfig, ImportOutcome};

/// Install the flowlight flows into Node-RED.
#[derive(Parser, Debug)]
#[command(name = "flowlight-import")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Node-RED base URL.
    #[arg(long, env = "NODE_RED_URL", default_value = "http://localhost:1880")]
    node_red_url: String,

    /// Flow definition file.
    #[arg(long, env = "FLOWS_FILE", default_value = "flows.json")]
    flows_file: PathBuf,

    /// Tab label that marks the flows as installed.
    #[arg(long, env = "FLOWS_TAB_LABEL", default_value = flowlight_importer::DEFAULT_TAB_LABEL)]
    tab_label: String,

    /// Readiness probes before giving up.
    #[arg(long, env = "IMPORT_MAX_ATTEMPTS", default_value_t = 30)]
    max_attempts: u32,

    /// Seconds between readiness probes.
    #[arg(long, env = "IMPORT_RETRY_INTERVAL", default_value_t = 5)]
    retry_interval_secs: u64,

    /// Timeout of each probe, in seconds.
    #[arg(long, env = "IMPORT_ATTEMPT_TIMEOUT", default_value_t = 5)]
    attempt_timeout_secs: u64,

    /// Seconds to wait between deploy and verification.
    #[arg(long, env = "IMPORT_SETTLE_SECS", default_value_t = 3)]
    settle_secs: u64,

    /// Endpoint to verify; repeat for several.
    #[arg(long = "verify", value_name = "PATH")]
    verify: Vec<String>,

    /// Enable debug logging.
    #[arg(long, default_value = "false")]
    debug: bool,
}

impl Args {
    fn into_config(self) -> anyhow::Result<ImportConfig> {
        anyhow::ensure!(self.max_attempts > 0, "--max-attempts must be at least 1");
        anyhow::ensure!(
            self.attempt_timeout_secs > 0,
            "--attempt-timeout-secs must be at least 1"
        );

        let defaults = ImportConfig::default();
        Ok(ImportConfig {
            node_red_url: self.node_red_url,
            flows_file: self.flows_file,
            tab_label: self.tab_label,
            max_attempts: self.max_attempts,
            retry_interval: Duration::from_secs(self.retry_interval_secs),
            attempt_timeout: Duration::from_secs(self.attempt_timeout_secs),
            settle_delay: Duration::from_secs(self.settle_secs),
            verify_endpoints: if self.verify.is_empty() {
                defaults.verify_endpoints
            } else {
                self.verify
            },
        })
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                if args.debug {
                    "info,flowlight=debug".into()
                } else {
                    "info".into()
                }
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(started_at = %chrono::Utc::now().to_rfc3339(), "Flowlight importer starting");

    let status = match args.into_config() {
        Ok(config) => run(config).await,
        Err(e) => {
            tracing::error!(error = %e, "Invalid arguments");
            ExitStatus::Failure
        }
    };

    std::process::exit(status.code());
}

async fn run(config: ImportConfig) -> ExitStatus {
    let importer = match FlowImporter::new(config) {
        Ok(importer) => importer,
        Err(e) => {
            tracing::error!(error = %e, "Cannot start importer");
            return e.exit_status();
        }
    };

    let mut task = tokio::spawn(async move { importer.run().await });

    tokio::select! {
        joined = &mut task => match joined {
            Ok(Ok(ImportOutcome::AlreadyInstalled { .. })) => {
                tracing::info!("Flows already imported and working");
                ExitStatus::Success
            }
            Ok(Ok(ImportOutcome::Imported { nodes, .. })) => {
                tracing::info!(nodes, "Auto-import completed successfully");
                ExitStatus::Success
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Import failed");
                e.exit_status()
            }
            Err(e) => {
                tracing::error!(error = %e, "Import task aborted unexpectedly");
                ExitStatus::Unexpected
            }
        },
        _ = tokio::signal::ctrl_c() => {
            task.abort();
            tracing::warn!("Import interrupted by user");
            ExitStatus::Interrupted
        }
    }
}
