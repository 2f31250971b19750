//! API error types and responses.
//!
//! This module defines the standard error format for all API responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use flowlight_bulb::BulbError;
use flowlight_core::CoreError;
use flowlight_engine::EngineError;

/// API error type that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The caller is not allowed to use this route.
    #[error("forbidden")]
    Forbidden,

    /// Invalid request body or parameters.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The engine failed or could not be reached.
    #[error("bad gateway: {0}")]
    BadGateway(String),

    /// No bulb is configured or its worker has stopped.
    #[error("device not initialized")]
    DeviceUnavailable,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

/// Error details.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::DeviceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Forbidden => "forbidden",
            Self::BadRequest(_) => "bad_request",
            Self::BadGateway(_) => "bad_gateway",
            Self::DeviceUnavailable => "device_unavailable",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        if err.is_upstream() {
            Self::BadGateway(err.to_string())
        } else {
            tracing::error!(error = %err, "Engine client error");
            Self::Internal("engine client error".to_string())
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<BulbError> for ApiError {
    fn from(err: BulbError) -> Self {
        match err {
            BulbError::QueueClosed => Self::DeviceUnavailable,
            other => {
                tracing::error!(error = %other, "Device error");
                Self::Internal(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_codes() {
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::BadRequest("test".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::BadGateway("test".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::DeviceUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::Internal("test".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn engine_errors() {
        let err = ApiError::from(EngineError::Http {
            url: "http://engine/sensors".into(),
            status: 404,
            body: String::new(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);

        let err = ApiError::from(EngineError::Unreachable {
            url: "http://engine/".into(),
            message: "refused".into(),
        });
        assert_eq!(err.code(), "bad_gateway");

        let err = ApiError::from(EngineError::Request("bad url".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn input_and_device_errors() {
        let err = ApiError::from(CoreError::MissingElement("UserString"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("UserString"));

        assert_eq!(
            ApiError::from(BulbError::QueueClosed).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(BulbError::QueueFull).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
