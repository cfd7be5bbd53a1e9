//! Resolution outcomes.

use axum::http::StatusCode;
use url::Url;

/// Status used for every link redirect.
///
/// 302 keeps the request method and lets clients re-resolve on each visit.
pub const REDIRECT_STATUS: StatusCode = StatusCode::FOUND;

/// Result of resolving a short key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    Found { destination: Url, status: StatusCode },
    NotFound,
    /// The durable store failed or timed out; nothing was cached
    UpstreamError(String),
}

impl RedirectOutcome {
    pub fn found(destination: Url) -> Self {
        Self::Found {
            destination,
            status: REDIRECT_STATUS,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}
