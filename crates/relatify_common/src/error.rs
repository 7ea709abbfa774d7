// --- File: crates/relatify_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for all Relatify errors.
///
/// This enum provides a common set of error variants that can be used across all crates.
/// Each crate can extend this by implementing From<SpecificError> for RelatifyError.
#[derive(Error, Debug)]
pub enum RelatifyError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during authentication or authorization
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// The external provider denied a scope or consent request. Callers
    /// surface this verbatim so the user is told to contact an
    /// administrator instead of retrying.
    #[error("Permission error: {0}")]
    PermissionError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to a timeout
    #[error("Timeout: {0}")]
    TimeoutError(String),

    /// Error occurred due to rate limiting
    #[error("Rate limited: {0}")]
    RateLimitError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
///
/// This trait can be implemented by error types to provide a consistent way
/// to convert errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for RelatifyError {
    fn status_code(&self) -> u16 {
        match self {
            RelatifyError::HttpError(_) => 500,
            RelatifyError::ParseError(_) => 400,
            RelatifyError::ConfigError(_) => 500,
            RelatifyError::AuthError(_) => 401,
            RelatifyError::PermissionError(_) => 403,
            RelatifyError::ValidationError(_) => 400,
            RelatifyError::ExternalServiceError { .. } => 502,
            RelatifyError::NotFoundError(_) => 404,
            RelatifyError::TimeoutError(_) => 504,
            RelatifyError::RateLimitError(_) => 429,
            RelatifyError::InternalError(_) => 500,
        }
    }
}

// Common error conversions
impl From<reqwest::Error> for RelatifyError {
    fn from(err: reqwest::Error) -> Self {
        RelatifyError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for RelatifyError {
    fn from(err: serde_json::Error) -> Self {
        RelatifyError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for RelatifyError {
    fn from(err: std::io::Error) -> Self {
        RelatifyError::InternalError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> RelatifyError {
    RelatifyError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> RelatifyError {
    RelatifyError::ValidationError(message.to_string())
}

pub fn auth_error<T: fmt::Display>(message: T) -> RelatifyError {
    RelatifyError::AuthError(message.to_string())
}

pub fn permission_error<T: fmt::Display>(message: T) -> RelatifyError {
    RelatifyError::PermissionError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> RelatifyError {
    RelatifyError::NotFoundError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> RelatifyError {
    RelatifyError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> RelatifyError {
    RelatifyError::InternalError(message.to_string())
}
