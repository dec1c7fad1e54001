//! API error handling module
//!
//! Provides a unified error type for all API endpoints with structured error variants.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use facedex_core::FacedexError;
use thiserror::Error;

/// API error type with structured variants for different error categories
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request - client provided invalid input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Not found - requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error - unexpected server-side failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Pipeline error - error from the face-indexing core
    #[error("Facedex error: {0}")]
    Facedex(#[from] FacedexError),
}

impl ApiError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create an internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Facedex(ref e) => match e {
                FacedexError::NotFound(_) => StatusCode::NOT_FOUND,
                FacedexError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                FacedexError::Conflict(_) => StatusCode::CONFLICT,
                FacedexError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                FacedexError::Malformed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            },
        }
    }

    /// Get the error code for programmatic error handling
    fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "INVALID_INPUT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Facedex(ref e) => match e {
                FacedexError::NotFound(_) => "NOT_FOUND",
                FacedexError::InvalidInput(_) => "INVALID_INPUT",
                FacedexError::Conflict(_) => "CONFLICT",
                FacedexError::Unavailable(_) => "UNAVAILABLE",
                FacedexError::Malformed(_) => "MALFORMED",
            },
        }
    }

    /// Get the error category for logging
    fn error_category(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal",
            Self::Facedex(_) => "facedex",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let category = self.error_category();
        let code = self.error_code();
        let message = self.to_string();

        // Log based on severity
        match status {
            s if s.is_server_error() => {
                tracing::error!(
                    status = %status,
                    category = category,
                    code = code,
                    error = %message,
                    "Server error"
                );
            }
            _ => {
                tracing::warn!(
                    status = %status,
                    category = category,
                    code = code,
                    error = %message,
                    "Client error"
                );
            }
        }

        // All error responses include a `code` field for programmatic error handling
        let body = serde_json::json!({
            "error": message,
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}
