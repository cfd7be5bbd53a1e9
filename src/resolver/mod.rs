//! Link Resolver Module
//!
//! Resolves short keys through the cache, falling back to the durable store
//! with negative caching and single-flight coalescing of concurrent misses.

mod inflight;
mod outcome;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::{Cached, ResolutionCache};
use crate::key::ShortKey;
use crate::store::{LinkStore, StoreError};

use inflight::{Claim, InFlight};
pub use outcome::{RedirectOutcome, REDIRECT_STATUS};

// == Resolver Config ==
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// TTL for cached links
    pub positive_ttl: Duration,
    /// TTL for tombstones, expected to be much shorter than `positive_ttl`
    pub negative_ttl: Duration,
    /// Upper bound on a single durable-store lookup
    pub store_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            positive_ttl: Duration::from_secs(300),
            negative_ttl: Duration::from_secs(30),
            store_timeout: Duration::from_secs(2),
        }
    }
}

// == Resolve Error ==
/// Faults that are not a resolution outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("lookup for {0} ended without publishing an outcome")]
    LookupAborted(ShortKey),
}

// == Link Resolver ==
/// Cache-fronted resolver over a [`LinkStore`].
#[derive(Clone)]
pub struct LinkResolver {
    cache: Arc<ResolutionCache>,
    store: Arc<dyn LinkStore>,
    inflight: Arc<InFlight<ShortKey, RedirectOutcome>>,
    config: ResolverConfig,
}

impl LinkResolver {
    pub fn new(
        cache: Arc<ResolutionCache>,
        store: Arc<dyn LinkStore>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            cache,
            store,
            inflight: InFlight::new(),
            config,
        }
    }

    // == Resolve ==
    /// Resolves `key` to a redirect outcome.
    ///
    /// Cache hits (links and tombstones) never touch the store. On a miss,
    /// concurrent callers for the same key share one store lookup. The lookup
    /// runs on its own task, so a caller that goes away does not stop the
    /// cache from being populated for the others.
    pub async fn resolve(&self, key: &ShortKey) -> Result<RedirectOutcome, ResolveError> {
        if let Some(outcome) = self.cached_outcome(key) {
            return Ok(outcome);
        }

        let mut rx = match self.inflight.claim(key, || self.peeked_outcome(key)) {
            Claim::Ready(outcome) => return Ok(outcome),
            Claim::Wait(rx) => {
                debug!("Joining in-flight lookup for {}", key);
                rx
            }
            Claim::Lead(guard, rx) => {
                debug!("Cache MISS for {}, querying store", key);
                let lookup = Lookup {
                    cache: Arc::clone(&self.cache),
                    store: Arc::clone(&self.store),
                    config: self.config.clone(),
                    key: key.clone(),
                };
                tokio::spawn(async move {
                    let outcome = lookup.run().await;
                    guard.complete(outcome);
                });
                rx
            }
        };

        let published = rx
            .wait_for(Option::is_some)
            .await
            .map(|value| value.clone())
            .ok()
            .flatten();
        published.ok_or_else(|| ResolveError::LookupAborted(key.clone()))
    }

    // == Invalidate ==
    /// Drops any cached state for `key`, e.g. after the link was edited.
    pub fn invalidate(&self, key: &ShortKey) -> bool {
        self.cache.invalidate(key)
    }

    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    fn cached_outcome(&self, key: &ShortKey) -> Option<RedirectOutcome> {
        let entry = self.cache.get(key)?;
        Some(self.outcome_for(key, entry.record))
    }

    /// Same as [`Self::cached_outcome`], without counting a hit or miss.
    fn peeked_outcome(&self, key: &ShortKey) -> Option<RedirectOutcome> {
        let record = self.cache.peek(key)?;
        Some(self.outcome_for(key, record))
    }

    fn outcome_for(&self, key: &ShortKey, record: Cached) -> RedirectOutcome {
        match record {
            Cached::Tombstone => {
                debug!("Cache HIT (tombstone) for {}", key);
                RedirectOutcome::NotFound
            }
            Cached::Link(record) if record.is_expired_at(Utc::now()) => {
                debug!("Cached link {} passed its expiry, caching tombstone", key);
                self.cache.put_tombstone(key.clone(), self.config.negative_ttl);
                RedirectOutcome::NotFound
            }
            Cached::Link(record) => {
                debug!("Cache HIT for {}", key);
                RedirectOutcome::found(record.destination.clone())
            }
        }
    }
}

// == Lookup ==
/// One durable-store round trip and the cache write that follows it.
struct Lookup {
    cache: Arc<ResolutionCache>,
    store: Arc<dyn LinkStore>,
    config: ResolverConfig,
    key: ShortKey,
}

impl Lookup {
    async fn run(self) -> RedirectOutcome {
        let result = tokio::time::timeout(self.config.store_timeout, self.store.lookup(&self.key))
            .await
            .unwrap_or(Err(StoreError::Timeout(self.config.store_timeout)));

        let record = match result {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!("Link {} not in store, caching tombstone", self.key);
                self.cache
                    .put_tombstone(self.key.clone(), self.config.negative_ttl);
                return RedirectOutcome::NotFound;
            }
            Err(e) => {
                warn!("Store lookup for {} failed: {}", self.key, e);
                return RedirectOutcome::UpstreamError(e.to_string());
            }
        };

        let now = Utc::now();
        if record.is_expired_at(now) {
            debug!("Link {} expired at {:?}", self.key, record.expires_at);
            self.cache
                .put_tombstone(self.key.clone(), self.config.negative_ttl);
            return RedirectOutcome::NotFound;
        }

        // Never cache a link past its own expiry
        let ttl = record
            .remaining_lifetime(now)
            .map_or(self.config.positive_ttl, |left| left.min(self.config.positive_ttl));

        let destination = record.destination.clone();
        self.cache
            .put(self.key.clone(), Cached::Link(Arc::new(record)), ttl);
        RedirectOutcome::found(destination)
    }
}
