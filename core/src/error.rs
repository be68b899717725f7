//! Error types for the blog API gateway.
//!
//! # Design
//! `GatewayError` is the failure taxonomy callers branch on. Every variant
//! carries the same text the gateway already showed the user, so a caller
//! that only logs `err.to_string()` stays consistent with the UI.
//!
//! `TransportError` is narrower: it only describes calls that produced no
//! HTTP response at all. A response with any status is not a transport error.

use thiserror::Error;

/// A classified failure returned by `HttpGateway::issue`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// HTTP succeeded but the envelope carried a non-zero code.
    #[error("{message}")]
    Business { code: i64, message: String },

    /// The server answered with a status and no usable envelope.
    #[error("{message}")]
    Transport { status: u16, message: String },

    /// The request was sent but nothing came back (timeout, refused, reset).
    #[error("{message}")]
    Network { message: String },

    /// The request could not be built or sent.
    #[error("{message}")]
    RequestSetup { message: String },
}

impl GatewayError {
    pub fn message(&self) -> &str {
        match self {
            GatewayError::Business { message, .. }
            | GatewayError::Transport { message, .. }
            | GatewayError::Network { message }
            | GatewayError::RequestSetup { message } => message,
        }
    }

    pub fn business_code(&self) -> Option<i64> {
        match self {
            GatewayError::Business { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            GatewayError::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure reported by a `Transport` when no response was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Sent, but no response arrived.
    #[error("no response: {0}")]
    NoResponse(String),

    /// Could not be constructed or dispatched.
    #[error("request setup failed: {0}")]
    Setup(String),
}

/// Errors raised while loading `GatewayConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}
