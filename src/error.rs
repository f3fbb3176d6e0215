//! Global error handling module for the Zephyre catalog gateway
//!
//! This module provides a unified error type that handles all application
//! errors and converts them to appropriate HTTP responses with consistent
//! JSON structure.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::client::UpstreamError;
use crate::identifier::IdentifierError;
use crate::models::ApiError;

/// Application-wide error type that unifies all error sources
#[derive(Debug, Error)]
pub enum AppError {
    /// Identifier normalization errors (bad request)
    #[error("Identifier error: {0}")]
    Identifier(#[from] IdentifierError),

    /// Upstream API errors (network, HTTP, decoding)
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Validation errors (bad request)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request - the caller sent an unusable identifier
            AppError::Identifier(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,

            // 500 Internal Server Error - upstream and internal errors
            AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            // Identifier errors carry their own remediation text.
            AppError::Identifier(err) => err.to_string(),

            AppError::Validation(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),

            AppError::Upstream(upstream_err) => match upstream_err {
                UpstreamError::Network(msg) => format!("Failed to connect to server: {}", msg),
                UpstreamError::Http(status) => {
                    format!("Server returned error status: {}", status)
                }
                UpstreamError::Decode(msg) => format!("Failed to read response: {}", msg),
            },
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_response = ApiError::new(self.user_message());

        HttpResponse::build(status).json(error_response)
    }
}

/// Result type alias for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;
