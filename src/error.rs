//! Error handling for the file upload client
//!
//! This module defines the error types used throughout the library.
//! Errors raised inside a background upload never reach the caller directly;
//! they are translated into a [`HubStatusCode`](crate::HubStatusCode) and
//! delivered through the user callback.

use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, UploadError>;

/// Error types that can occur when using the upload client
#[derive(Error, Debug)]
pub enum UploadError {
    /// Invalid parameter supplied by the caller
    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter { parameter: String, message: String },

    /// Hub transport failed to open, send or close
    #[error("Transport error: {operation} - {message}")]
    TransportError { operation: String, message: String },

    /// Blob storage rejected or failed the upload
    #[error("Storage error: {message}")]
    StorageError { message: String },

    /// Hub answered with a body that does not describe a blob destination
    #[error("Malformed hub response: {message}")]
    MalformedResponse { message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Background upload worker died before reporting a status
    #[error("Upload worker failed: {message}")]
    WorkerError { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UploadError {
    /// Create a new invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        UploadError::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport_error(operation: impl Into<String>, message: impl Into<String>) -> Self {
        UploadError::TransportError {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage_error(message: impl Into<String>) -> Self {
        UploadError::StorageError {
            message: message.into(),
        }
    }

    /// Create a new malformed response error
    pub fn malformed_response(message: impl Into<String>) -> Self {
        UploadError::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        UploadError::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new worker error
    pub fn worker_error(message: impl Into<String>) -> Self {
        UploadError::WorkerError {
            message: message.into(),
        }
    }
}
