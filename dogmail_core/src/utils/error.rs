//! Centralized error handling for DogMail
//!
//! This module provides a unified error handling approach using:
//! - `thiserror` for library-style errors with proper error types
//! - `anyhow` for application-level error handling with context
//!
//! # Usage
//!
//! ```rust,ignore
//! use dogmail_core::utils::error::{DogmailResult, ResultExt};
//!
//! fn load() -> DogmailResult<String> {
//!     let text = std::fs::read_to_string("config.yaml").with_file_context("config.yaml")?;
//!     Ok(text)
//! }
//! ```

use thiserror::Error;

/// Core errors that can occur in DogMail
#[derive(Error, Debug)]
pub enum DogmailError {
    /// Email rejected by the shared validation rule
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Submission transport errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Malformed email strings, detected client-side or server-side.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("email address is empty")]
    Empty,

    #[error("'{0}' is not a valid email address")]
    Malformed(String),
}

/// Failures while delivering an email to the submission endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection refused, DNS failure, reset, ...
    #[error("Network error: {0}")]
    Network(String),

    /// Request timeout
    #[error("Request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// Endpoint answered with a non-success status
    #[error("Server error ({status_code}): {message}")]
    Status { status_code: u16, message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest does not report the configured value back
            TransportError::Timeout { timeout_ms: 0 }
        } else if let Some(status) = err.status() {
            TransportError::Status {
                status_code: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// Result type alias for DogMail operations
pub type DogmailResult<T> = anyhow::Result<T>;

/// Extension trait for adding DogMail-specific context to errors
pub trait ResultExt<T> {
    /// Add file operation context to an error
    fn with_file_context(self, path: &str) -> DogmailResult<T>;

    /// Add configuration context to an error
    fn with_config_context(self, setting: &str) -> DogmailResult<T>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for Result<T, E> {
    fn with_file_context(self, path: &str) -> DogmailResult<T> {
        use anyhow::Context;
        self.map_err(|e| anyhow::anyhow!(e))
            .with_context(|| format!("File operation failed: {}", path))
    }

    fn with_config_context(self, setting: &str) -> DogmailResult<T> {
        use anyhow::Context;
        self.map_err(|e| anyhow::anyhow!(e))
            .with_context(|| format!("Configuration error for: {}", setting))
    }
}
