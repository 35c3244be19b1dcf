//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how it is
//! reported to HTTP clients.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use study_assistant_core::ports::PortError;
use tracing::error;
use utoipa::ToSchema;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// The multipart upload could not be read.
    #[error("Upload error: {0}")]
    Upload(String),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// The JSON body returned with every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Port(port) => match port {
                PortError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                PortError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
                PortError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                PortError::NotFound(_) => StatusCode::NOT_FOUND,
                PortError::Generation(_) | PortError::Unavailable(_) => StatusCode::BAD_GATEWAY,
                PortError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Upload(_) => StatusCode::BAD_REQUEST,
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Port(port) => port.to_string(),
            Self::Upload(message) => message.clone(),
            _ => "Internal server error".to_string(),
        };
        if status.is_server_error() {
            error!("Request failed: {:?}", self);
        }
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_errors_map_to_client_facing_statuses() {
        let cases = [
            (PortError::UnsupportedFormat("docx".into()), StatusCode::UNSUPPORTED_MEDIA_TYPE),
            (PortError::Extraction("corrupt".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (PortError::InvalidInput("action".into()), StatusCode::BAD_REQUEST),
            (PortError::NotFound("session".into()), StatusCode::NOT_FOUND),
            (PortError::Generation("empty".into()), StatusCode::BAD_GATEWAY),
            (PortError::Unavailable("timeout".into()), StatusCode::BAD_GATEWAY),
            (PortError::Unexpected("oops".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (port, status) in cases {
            assert_eq!(ApiError::from(port).status(), status);
        }
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let response = ApiError::Internal("db password wrong".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
