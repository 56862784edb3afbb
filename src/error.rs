//! Error types for hubfetch
//!
//! This module provides the error handling for the crate, including:
//! - Domain-specific error types (remote API failures, conversion, artifacts)
//! - HTTP status code mapping for the export backend
//! - The `{error, details}` JSON body returned by the backend on failure

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for hubfetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for hubfetch
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "youtube.client_id")
        key: Option<String>,
    },

    /// Repository reference could not be split into owner and name
    #[error("invalid repository reference: {0}")]
    InvalidReference(String),

    /// Export requested before any repository metadata was loaded
    #[error("no repository loaded")]
    NoRepository,

    /// Authenticated call attempted without a bearer token
    #[error("not authorized")]
    Unauthorized,

    /// OAuth callback carried no access token
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Channel lookup returned no channels
    #[error("no channel found with id {0}")]
    ChannelNotFound(String),

    /// Remote API call failed (GitHub, YouTube)
    #[error("remote API error: {0}")]
    Remote(#[from] RemoteFailure),

    /// Converter process failed
    #[error("conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    /// Converter output could not be resolved to a readable file
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// Export backend answered with an error payload
    #[error("export backend returned {status}: {error} ({details})")]
    ExportFailed {
        /// HTTP status returned by the backend
        status: u16,
        /// `error` field of the payload
        error: String,
        /// `details` field of the payload
        details: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Transport-stage classification of a failed remote call
///
/// The three variants are mutually exclusive: either a response arrived with
/// an error status, or the request went out and nothing usable came back, or
/// the request could not be built in the first place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteFailure {
    /// A response was received with a non-success status
    #[error("Error {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body, or the status reason
        message: String,
    },

    /// The request was sent but no response was received
    #[error("no response received: {0}")]
    NoResponse(String),

    /// The request could not be constructed or its result could not be read
    #[error("{0}")]
    Setup(String),
}

impl RemoteFailure {
    /// Classify a transport error from `reqwest`
    pub fn classify(err: &reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            RemoteFailure::Status {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string(),
            }
        } else if err.is_builder() {
            RemoteFailure::Setup(err.to_string())
        } else if err.is_connect() || err.is_timeout() || err.is_request() || err.is_body() {
            RemoteFailure::NoResponse(err.to_string())
        } else {
            RemoteFailure::Setup(err.to_string())
        }
    }
}

/// Converter process errors
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The converter binary could not be started
    #[error("failed to execute converter {program}: {reason}")]
    Spawn {
        /// Program that was attempted
        program: PathBuf,
        /// OS error text
        reason: String,
    },

    /// The converter exited with a non-zero status
    #[error("converter exited with {exit_code:?}: {stderr}")]
    Failed {
        /// Exit code, `None` if killed by a signal
        exit_code: Option<i32>,
        /// Raw standard-error text
        stderr: String,
    },

    /// The converter exited zero but wrote to standard error
    #[error("converter reported errors: {stderr}")]
    Stderr {
        /// Raw standard-error text
        stderr: String,
    },

    /// The converter did not finish within the configured timeout
    #[error("converter timed out after {seconds}s")]
    TimedOut {
        /// Configured timeout in seconds
        seconds: u64,
    },
}

impl ConversionError {
    /// Diagnostic text sent back to the client
    pub fn details(&self) -> String {
        match self {
            ConversionError::Failed { stderr, .. } | ConversionError::Stderr { stderr } => {
                stderr.clone()
            }
            other => other.to_string(),
        }
    }
}

/// Artifact resolution errors
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The converter printed nothing on standard output
    #[error("converter did not report an output file")]
    NoFileName,

    /// The reported filename points outside the request directory
    #[error("artifact name {name} escapes the export directory")]
    OutsideWorkDir {
        /// Name as printed by the converter
        name: String,
    },

    /// The artifact could not be read
    #[error("failed to read {path}: {reason}")]
    Unreadable {
        /// Resolved artifact path
        path: PathBuf,
        /// OS error text
        reason: String,
    },
}

/// API error response format
///
/// Returned by the backend when an export fails.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": "Error processing repository",
///   "details": "fatal: repository not found\n"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Short summary of what failed
    pub error: String,
    /// Raw diagnostic text
    pub details: String,
}

impl ApiError {
    /// Create a new API error
    pub fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::InvalidReference(_) => 400,
            Error::NoRepository => 400,

            // 401 Unauthorized
            Error::Unauthorized => 401,
            Error::Authentication(_) => 401,

            // 404 Not Found
            Error::ChannelNotFound(_) => 404,

            // 500 Internal Server Error - conversion and artifact failures
            Error::Conversion(_) => 500,
            Error::Artifact(_) => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,

            // 502 Bad Gateway - External service errors
            Error::Remote(_) => 502,
            Error::Network(_) => 502,
            Error::ExportFailed { .. } => 502,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::InvalidReference(_) => "invalid_reference",
            Error::NoRepository => "no_repository",
            Error::Unauthorized => "unauthorized",
            Error::Authentication(_) => "authentication_failed",
            Error::ChannelNotFound(_) => "channel_not_found",
            Error::Remote(e) => match e {
                RemoteFailure::Status { .. } => "remote_status",
                RemoteFailure::NoResponse(_) => "remote_no_response",
                RemoteFailure::Setup(_) => "remote_request_error",
            },
            Error::Conversion(e) => match e {
                ConversionError::Spawn { .. } => "converter_spawn_failed",
                ConversionError::Failed { .. } => "converter_failed",
                ConversionError::Stderr { .. } => "converter_stderr",
                ConversionError::TimedOut { .. } => "converter_timeout",
            },
            Error::Artifact(e) => match e {
                ArtifactError::NoFileName => "artifact_name_missing",
                ArtifactError::OutsideWorkDir { .. } => "artifact_outside_work_dir",
                ArtifactError::Unreadable { .. } => "artifact_unreadable",
            },
            Error::ExportFailed { .. } => "export_failed",
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        match &error {
            Error::Conversion(e) => ApiError::new("Error processing repository", e.details()),
            Error::Artifact(ArtifactError::Unreadable { reason, .. }) => {
                ApiError::new("Error sending file", reason.clone())
            }
            Error::Artifact(e) => ApiError::new("Error sending file", e.to_string()),
            _ => ApiError::new(error.to_string(), error.error_code()),
        }
    }
}
