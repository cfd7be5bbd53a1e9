//! API Handlers
//!
//! The redirect handler and the request helpers it relies on.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tracing::{debug, error, warn};
use url::{form_urlencoded, Url};

use super::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::key;
use crate::resolver::{LinkResolver, RedirectOutcome};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: LinkResolver,
    pub gateway: Arc<GatewayConfig>,
}

impl AppState {
    pub fn new(resolver: LinkResolver, gateway: GatewayConfig) -> Self {
        Self {
            resolver,
            gateway: Arc::new(gateway),
        }
    }
}

/// Handler for every request on the router.
///
/// # Request Flow
///
/// 1. Reject hosts other than the short domain (400)
/// 2. `/` redirects to the fallback landing page
/// 3. Parse the key; malformed keys are reported as not found (404)
/// 4. Resolve the key and redirect with incoming query parameters merged in
///
/// Store failures become 503, anything unexpected 500. Error bodies are
/// fixed plain-text strings.
pub async fn redirect_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response> {
    let host = request_host(&headers, &uri);
    if !host
        .as_deref()
        .is_some_and(|h| state.gateway.accepts_host(h))
    {
        debug!("Rejecting request for host {:?}", host);
        return Err(GatewayError::InvalidDomain(host));
    }

    let path = uri.path();
    if path.strip_prefix('/').unwrap_or(path).is_empty() {
        return Ok(redirect(
            StatusCode::FOUND,
            state.gateway.fallback_landing_url().as_str(),
        ));
    }

    let key = key::parse(path).map_err(|e| {
        debug!("Invalid key in path {:?}: {}", path, e);
        GatewayError::from(e)
    })?;

    let outcome = state.resolver.resolve(&key).await.map_err(|e| {
        error!(key = %key, "Resolution failed: {}", e);
        GatewayError::from(e)
    })?;

    match outcome {
        RedirectOutcome::Found {
            destination,
            status,
        } => {
            let location = merge_query(destination, uri.query());
            Ok(redirect(status, location.as_str()))
        }
        RedirectOutcome::NotFound => Err(GatewayError::NotFound),
        RedirectOutcome::UpstreamError(reason) => {
            warn!(key = %key, "Upstream unavailable: {}", reason);
            Err(GatewayError::Unavailable(reason))
        }
    }
}

fn redirect(status: StatusCode, location: &str) -> Response {
    (status, [(header::LOCATION, location.to_string())]).into_response()
}

// == Request Host ==
/// Extracts the host name the request was addressed to, without port.
///
/// Prefers the `Host` header and falls back to the URI authority (HTTP/2).
/// IPv6 literals keep their brackets.
pub fn request_host(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let raw = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))?;

    let host = if raw.starts_with('[') {
        match raw.find(']') {
            Some(end) => &raw[..=end],
            None => raw,
        }
    } else {
        raw.split(':').next().unwrap_or(raw)
    };

    let host = host.trim_end_matches('.');
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

// == Query Passthrough ==
/// Appends incoming query parameters whose names the destination does not
/// already carry. Destination parameters always win.
pub fn merge_query(mut destination: Url, incoming: Option<&str>) -> Url {
    let Some(incoming) = incoming.filter(|q| !q.is_empty()) else {
        return destination;
    };

    let existing: HashSet<String> = destination
        .query_pairs()
        .map(|(name, _)| name.into_owned())
        .collect();

    let extra: Vec<(String, String)> = form_urlencoded::parse(incoming.as_bytes())
        .filter(|(name, _)| !existing.contains(&**name))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    if !extra.is_empty() {
        destination.query_pairs_mut().extend_pairs(extra);
    }
    destination
}
