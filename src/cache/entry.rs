//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::store::LinkRecord;

// == Cached Value ==
/// What a cache entry remembers about a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cached {
    /// Snapshot of the durable record
    Link(Arc<LinkRecord>),
    /// The durable store confirmed the key is absent
    Tombstone,
}

impl Cached {
    pub fn is_tombstone(&self) -> bool {
        matches!(self, Cached::Tombstone)
    }
}

// == Cache Entry ==
/// A cached resolution result with its own TTL.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub record: Cached,
    pub cached_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry cached now.
    pub fn new(record: Cached, ttl: Duration) -> Self {
        Self {
            record,
            cached_at: Instant::now(),
            ttl,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry is expired once its age is greater than or equal to its TTL,
    /// so a zero TTL entry is never served.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.cached_at) >= self.ttl
    }

    #[cfg(test)]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    // == Time To Live ==
    /// Returns remaining TTL, zero once expired.
    #[cfg(test)]
    pub fn ttl_remaining(&self) -> Duration {
        self.ttl
            .saturating_sub(Instant::now().saturating_duration_since(self.cached_at))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ShortKey;
    use url::Url;

    fn link() -> Cached {
        Cached::Link(Arc::new(LinkRecord::new(
            ShortKey::new("abc").unwrap(),
            Url::parse("https://example.com").unwrap(),
        )))
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expiration() {
        let entry = CacheEntry::new(link(), Duration::from_secs(1));
        assert!(!entry.is_expired());

        tokio::time::advance(Duration::from_millis(999)).await;
        assert!(!entry.is_expired());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(entry.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_remaining() {
        let entry = CacheEntry::new(Cached::Tombstone, Duration::from_secs(10));
        assert_eq!(entry.ttl_remaining(), Duration::from_secs(10));

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(entry.ttl_remaining(), Duration::from_secs(6));

        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(entry.ttl_remaining(), Duration::ZERO);
    }

    #[test]
    fn test_zero_ttl_is_expired_immediately() {
        let entry = CacheEntry::new(link(), Duration::ZERO);
        assert!(entry.is_expired_at(entry.cached_at));
    }

    #[test]
    fn test_tombstone_flag() {
        assert!(Cached::Tombstone.is_tombstone());
        assert!(!link().is_tombstone());
    }
}
