//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{data, health, notify, tuya};
use crate::state::AppState;

/// Create the gateway router with all routes and middleware.
///
/// # Routes
///
/// ## Status
/// - `GET /` - Service banner
/// - `GET /api/health` - Gateway, engine and device status
///
/// ## Engine passthrough
/// - `GET /api/data/{endpoint}` - Forward a read
/// - `POST /api/data/{endpoint}` - Forward a JSON write
/// - `GET /api/sensors` - Shortcut for `/api/data/sensors`
/// - `GET /api/devices` - Shortcut for `/api/data/devices`
///
/// ## Bulb
/// - `POST /api/notify` - XML notification from an alarm panel
/// - `GET /api/tuya/code/{code}` - Show a colour code
/// - `GET /api/tuya/test` - Cycle through every colour
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.cors_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = state.config.request_timeout;

    Router::new()
        .route("/", get(health::root))
        .route("/api/health", get(health::health))
        // Engine passthrough
        .route(
            "/api/data/{endpoint}",
            get(data::get_data).post(data::post_data),
        )
        .route("/api/sensors", get(data::sensors))
        .route("/api/devices", get(data::devices))
        // Bulb
        .route("/api/notify", post(notify::notify))
        .route("/api/tuya/code/{code}", get(tuya::show_code))
        .route("/api/tuya/test", get(tuya::test_sequence))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring unparsable CORS origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
