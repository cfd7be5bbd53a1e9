//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::api::GatewayConfig;
use crate::error::ConfigError;
use crate::resolver::ResolverConfig;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host name requests must be addressed to
    pub short_domain: String,
    /// Where `/` redirects to
    pub fallback_landing_url: String,
    /// TTL for cached links
    pub positive_ttl: Duration,
    /// TTL for cached "not found" results
    pub negative_ttl: Duration,
    /// Maximum number of cache entries, links and tombstones combined
    pub cache_capacity: usize,
    /// Timeout for a single durable-store lookup
    pub store_timeout: Duration,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval
    pub cleanup_interval: Duration,
    /// Optional JSON file seeding the in-memory link store
    pub links_file: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SHORT_DOMAIN` - Short-link host (default: go.example.com)
    /// - `FALLBACK_LANDING_URL` - Target for `/` (default: https://example.com)
    /// - `POSITIVE_TTL` - Link cache TTL in seconds (default: 300)
    /// - `NEGATIVE_TTL` - Tombstone TTL in seconds (default: 30)
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 10000)
    /// - `STORE_TIMEOUT_MS` - Store lookup timeout in milliseconds (default: 2000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 5)
    /// - `LINKS_FILE` - JSON array of links to serve (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            short_domain: env::var("SHORT_DOMAIN").unwrap_or(defaults.short_domain),
            fallback_landing_url: env::var("FALLBACK_LANDING_URL")
                .unwrap_or(defaults.fallback_landing_url),
            positive_ttl: parse_var("POSITIVE_TTL")
                .map(Duration::from_secs)
                .unwrap_or(defaults.positive_ttl),
            negative_ttl: parse_var("NEGATIVE_TTL")
                .map(Duration::from_secs)
                .unwrap_or(defaults.negative_ttl),
            cache_capacity: parse_var("CACHE_CAPACITY").unwrap_or(defaults.cache_capacity),
            store_timeout: parse_var("STORE_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.store_timeout),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL")
                .map(Duration::from_secs)
                .unwrap_or(defaults.cleanup_interval),
            links_file: env::var_os("LINKS_FILE").map(PathBuf::from),
        }
    }

    /// Checks values that have no sensible fallback.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.short_domain.trim().is_empty() {
            return Err(ConfigError::EmptyDomain);
        }
        self.fallback_url()?;
        if self.negative_ttl > self.positive_ttl {
            return Err(ConfigError::NegativeTtlTooLong {
                negative: self.negative_ttl,
                positive: self.positive_ttl,
            });
        }
        if self.store_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.cleanup_interval.is_zero() {
            return Err(ConfigError::ZeroCleanupInterval);
        }
        Ok(())
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            positive_ttl: self.positive_ttl,
            negative_ttl: self.negative_ttl,
            store_timeout: self.store_timeout,
        }
    }

    pub fn gateway_config(&self) -> Result<GatewayConfig, ConfigError> {
        Ok(GatewayConfig::new(&self.short_domain, self.fallback_url()?))
    }

    fn fallback_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.fallback_landing_url).map_err(|e| ConfigError::InvalidFallbackUrl {
            url: self.fallback_landing_url.clone(),
            reason: e.to_string(),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            short_domain: "go.example.com".to_string(),
            fallback_landing_url: "https://example.com".to_string(),
            positive_ttl: Duration::from_secs(300),
            negative_ttl: Duration::from_secs(30),
            cache_capacity: 10_000,
            store_timeout: Duration::from_millis(2000),
            server_port: 3000,
            cleanup_interval: Duration::from_secs(5),
            links_file: None,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
