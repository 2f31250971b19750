//! Flowlight Gateway - HTTP API for the automation engine and the status bulb.
//!
//! This is the main entry point for the gateway service. All settings come
//! from environment variables; see [`GatewayConfig`].
//!
//! # Device
//!
//! Set `TUYA_DEVICE_ID`, `TUYA_DEVICE_IP` and `TUYA_LOCAL_KEY` to drive a
//! bulb. Without them, or when the bulb cannot be reached at startup, the
//! gateway still serves the engine routes and answers 503 on the bulb routes.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flowlight_bulb::{join_worker, Dispatcher, TuyaBulb, TuyaConfig};
use flowlight_engine::EngineClient;
use flowlight_gateway::{create_router, AppState, GatewayConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = GatewayConfig::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Flowlight Gateway");
    tracing::info!(
        bind = %config.bind_addr(),
        node_red_url = %config.node_red_url,
        cors_origins = ?config.cors_origins,
        notify_allowed_ip = ?config.notify_allowed_ip,
        device = config.tuya.is_some(),
        "Gateway configuration loaded"
    );

    let engine = EngineClient::new(&config.node_red_url, config.node_red_timeout)?;

    let (device, worker) = match config.tuya.clone() {
        Some(tuya) => match connect_bulb(tuya).await {
            Some(bulb) => {
                let (dispatcher, worker) = Dispatcher::spawn(bulb, config.dispatch);
                (Some(dispatcher), Some(worker))
            }
            None => (None, None),
        },
        None => {
            tracing::warn!("No TUYA_* variables set - running without a device");
            (None, None)
        }
    };

    let bind_addr = config.bind_addr();
    let shutdown_grace = config.shutdown_grace;
    let state = AppState::new(engine, device, config);
    let app = create_router(state);

    tracing::info!(listen_addr = %bind_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router, and with it the last dispatcher handle, is gone once
    // `serve` returns, so the worker drains its queue and exits. One stuck on
    // a silent device is aborted after the grace period.
    if let Some(worker) = worker {
        join_worker(worker, shutdown_grace).await;
    }

    tracing::info!("Gateway shut down");
    Ok(())
}

/// Connect to the bulb, logging instead of failing when it is unreachable.
async fn connect_bulb(config: TuyaConfig) -> Option<Arc<TuyaBulb>> {
    let address = config.address();
    match TuyaBulb::connect(config).await {
        Ok(bulb) => {
            tracing::info!(address = %address, "Device connected");
            Some(Arc::new(bulb))
        }
        Err(e) => {
            tracing::warn!(address = %address, error = %e, "Device unavailable, bulb routes disabled");
            None
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
