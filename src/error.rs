//! Common error types for the prompt gallery

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// A required field was missing or blank
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A query that cannot be interpreted as search text
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Image generation failed: {0}")]
    Generation(String),

    #[error("Image generation timed out: {0}")]
    GenerationTimeout(String),

    #[error("Media storage failed: {0}")]
    Storage(String),

    #[error("Post repository unavailable: {0}")]
    RepositoryUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error belongs to the generation family (including timeouts)
    pub fn is_generation(&self) -> bool {
        matches!(self, AppError::Generation(_) | AppError::GenerationTimeout(_))
    }
}

/// Error response format (OpenAI compatible)
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: String,
    pub code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, code) = match &self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", None),
            AppError::Json(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", None),
            AppError::HttpClient(_) => (StatusCode::BAD_GATEWAY, "upstream_error", None),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "invalid_request_error", Some("validation_failed")),
            AppError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "invalid_request_error", Some("invalid_argument")),
            AppError::Generation(_) => (StatusCode::BAD_GATEWAY, "generation_error", None),
            AppError::GenerationTimeout(_) => (StatusCode::GATEWAY_TIMEOUT, "generation_error", Some("generation_timeout")),
            AppError::Storage(_) => (StatusCode::BAD_GATEWAY, "storage_error", None),
            AppError::RepositoryUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "server_error", Some("repository_unavailable")),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", None),
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                message: self.to_string(),
                r#type: error_type.to_string(),
                code: code.map(|c| c.to_string()),
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
