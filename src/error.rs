//! Error types for the redirect gateway
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::key::InvalidKeyError;
use crate::resolver::ResolveError;

// == Gateway Error Enum ==
/// Every non-redirect answer the gateway gives.
///
/// The `Display` text is for logs; clients only ever see the fixed
/// [`GatewayError::public_message`].
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Request was not addressed to the short-link domain
    #[error("request host {0:?} does not match the short domain")]
    InvalidDomain(Option<String>),

    /// Malformed key or key absent from the store
    #[error("link not found")]
    NotFound,

    /// Durable store unreachable, erroring or timed out
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidDomain(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn public_message(&self) -> &'static str {
        match self {
            GatewayError::InvalidDomain(_) => "Invalid domain",
            GatewayError::NotFound => "Link not found",
            GatewayError::Unavailable(_) => "Service unavailable",
            GatewayError::Internal(_) => "Internal error",
        }
    }
}

impl From<InvalidKeyError> for GatewayError {
    fn from(_: InvalidKeyError) -> Self {
        GatewayError::NotFound
    }
}

impl From<ResolveError> for GatewayError {
    fn from(e: ResolveError) -> Self {
        GatewayError::Internal(e.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.public_message(),
        )
            .into_response()
    }
}

// == Config Error Enum ==
/// Startup configuration problems.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SHORT_DOMAIN must not be empty")]
    EmptyDomain,

    #[error("FALLBACK_LANDING_URL {url:?} is not a valid URL: {reason}")]
    InvalidFallbackUrl { url: String, reason: String },

    #[error("NEGATIVE_TTL ({negative:?}) must not exceed POSITIVE_TTL ({positive:?})")]
    NegativeTtlTooLong {
        negative: Duration,
        positive: Duration,
    },

    #[error("STORE_TIMEOUT_MS must be greater than zero")]
    ZeroTimeout,

    #[error("CLEANUP_INTERVAL must be greater than zero")]
    ZeroCleanupInterval,
}

/// Convenience Result type for gateway handlers.
pub type Result<T> = std::result::Result<T, GatewayError>;
