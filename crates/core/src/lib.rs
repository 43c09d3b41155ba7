//! Shared primitives for all Rust crates in Actordeck.

#![forbid(unsafe_code)]

/// Credential primitives shared by the proxy and its clients.
pub mod auth;

use serde_json::Value;
use thiserror::Error;

pub use auth::{API_KEY_PREFIX, ApiKey};

/// Result type used across Actordeck crates.
pub type AppResult<T> = Result<T, AppError>;

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// One input field failed validation; keeps the value that was received.
    #[error("{message}")]
    InvalidField {
        /// Human-readable reason shown to the caller.
        message: String,
        /// Raw value the caller supplied, absent when the field was missing.
        received: Option<Value>,
    },

    /// Caller credential is missing, malformed or rejected.
    #[error("{0}")]
    Unauthorized(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The Apify platform could not be reached or answered with an error.
    #[error("upstream error: {message}")]
    Upstream {
        /// HTTP status returned by the platform, absent on transport failures.
        status: Option<u16>,
        /// Short description of the failed call.
        message: String,
        /// Upstream error payload, or the transport message when there is none.
        details: Value,
    },

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Builds an upstream error for a transport level failure.
    #[must_use]
    pub fn upstream_transport(message: impl Into<String>, cause: impl ToString) -> Self {
        Self::Upstream {
            status: None,
            message: message.into(),
            details: Value::String(cause.to_string()),
        }
    }

    /// Returns the payload that should be surfaced to callers as `details`.
    #[must_use]
    pub fn details(&self) -> Value {
        match self {
            Self::Upstream { details, .. } => details.clone(),
            other => Value::String(other.to_string()),
        }
    }
}
