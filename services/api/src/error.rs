//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how each
//! variant is reported to HTTP clients.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;
use typespark_core::{EngineError, PortError};

use crate::config::ConfigError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error raised by the study session engine.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Represents an error that propagated up from one of the service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The request itself was malformed.
    #[error("{0}")]
    BadRequest(String),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Engine(EngineError::SessionNotFound(_))
            | ApiError::Engine(EngineError::ItemNotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Engine(EngineError::SessionExhausted(_)) => StatusCode::CONFLICT,
            ApiError::Engine(EngineError::EmptyContent) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Engine(EngineError::Store(port)) | ApiError::Port(port) => match port {
                PortError::Unsupported(_) => StatusCode::BAD_REQUEST,
                PortError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Config(_) | ApiError::Io(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {:?}", self);
        }

        let body = match self {
            ApiError::Engine(EngineError::SessionExhausted(_)) => json!({
                "error": "No more items in session",
                "session_completed": true,
            }),
            ApiError::Engine(EngineError::SessionNotFound(_)) => json!({
                "error": "Session not found",
            }),
            ApiError::Engine(EngineError::ItemNotFound { .. }) => json!({
                "error": "Item not found",
            }),
            // Internals stay in the log.
            _ if status.is_server_error() => json!({
                "error": "Internal server error",
            }),
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn engine_errors_map_to_client_statuses() {
        let id = Uuid::new_v4();
        assert_eq!(
            ApiError::from(EngineError::SessionNotFound(id)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(EngineError::SessionExhausted(id)).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(EngineError::EmptyContent).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn port_errors_map_by_kind() {
        assert_eq!(
            ApiError::from(PortError::Unsupported("scan.pdf".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(EngineError::Store(PortError::Unexpected("disk".into()))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
