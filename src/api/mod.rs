//! API Module
//!
//! The HTTP entrypoint of the short-link gateway.
//!
//! Every path on the short domain is a redirect lookup:
//! - `GET /` - Redirect to the fallback landing page
//! - `GET /{key}` - Redirect to the link's destination

pub mod handlers;
pub mod routes;

use url::Url;

pub use handlers::*;
pub use routes::create_router;

/// Per-gateway settings, taken from [`crate::Config`] at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    short_domain: String,
    fallback_landing_url: Url,
}

impl GatewayConfig {
    pub fn new(short_domain: &str, fallback_landing_url: Url) -> Self {
        Self {
            short_domain: short_domain.trim().to_ascii_lowercase(),
            fallback_landing_url,
        }
    }

    pub fn short_domain(&self) -> &str {
        &self.short_domain
    }

    pub fn fallback_landing_url(&self) -> &Url {
        &self.fallback_landing_url
    }

    /// Host names are compared ASCII case-insensitively.
    pub fn accepts_host(&self, host: &str) -> bool {
        host.eq_ignore_ascii_case(&self.short_domain)
    }
}
