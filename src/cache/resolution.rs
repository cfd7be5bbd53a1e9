//! Resolution Cache Module
//!
//! Main cache engine combining HashMap storage with LRU tracking and TTL expiration.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::trace;

use crate::cache::{CacheEntry, CacheStats, Cached, LruTracker};
use crate::key::ShortKey;

// == Cache State ==
#[derive(Debug)]
struct CacheState {
    entries: HashMap<ShortKey, CacheEntry>,
    lru: LruTracker<ShortKey>,
    stats: CacheStats,
}

impl CacheState {
    fn remove(&mut self, key: &ShortKey) -> bool {
        let removed = self.entries.remove(key).is_some();
        self.lru.remove(key);
        self.stats.set_total_entries(self.entries.len());
        removed
    }
}

// == Resolution Cache ==
/// Short key → link/tombstone cache with per-entry TTL and LRU eviction.
///
/// Link entries and tombstones share one capacity and one recency order.
/// All methods take `&self`; the internal lock is never held across an
/// `.await`, so the cache can be shared as `Arc<ResolutionCache>`.
#[derive(Debug)]
pub struct ResolutionCache {
    state: Mutex<CacheState>,
    capacity: usize,
}

impl ResolutionCache {
    // == Constructor ==
    /// Creates a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::with_capacity(capacity),
                lru: LruTracker::with_capacity(capacity),
                stats: CacheStats::new(),
            }),
            capacity,
        }
    }

    // == Get ==
    /// Returns the live entry for `key`.
    ///
    /// Expired entries are removed and counted as misses.
    pub fn get(&self, key: &ShortKey) -> Option<CacheEntry> {
        let mut state = self.state.lock();
        let now = Instant::now();

        let expired = match state.entries.get(key) {
            None => {
                state.stats.record_miss();
                return None;
            }
            Some(entry) => entry.is_expired_at(now),
        };

        if expired {
            state.remove(key);
            state.stats.record_expirations(1);
            state.stats.record_miss();
            trace!("Cache entry for {} expired", key);
            return None;
        }

        let entry = state.entries.get(key).cloned()?;
        if entry.record.is_tombstone() {
            state.stats.record_negative_hit();
        } else {
            state.stats.record_hit();
        }
        state.lru.touch(key);
        Some(entry)
    }

    // == Put ==
    /// Inserts or replaces the entry for `key`.
    ///
    /// If the key is new and the cache is full, the least recently used
    /// entry is evicted first.
    pub fn put(&self, key: ShortKey, record: Cached, ttl: Duration) {
        let mut state = self.state.lock();

        if !state.entries.contains_key(&key) && state.entries.len() >= self.capacity {
            if let Some(evicted) = state.lru.evict_oldest() {
                state.entries.remove(&evicted);
                state.stats.record_eviction();
                trace!("Evicted {} to make room for {}", evicted, key);
            }
        }

        state.lru.touch(&key);
        state.entries.insert(key, CacheEntry::new(record, ttl));
        let len = state.entries.len();
        state.stats.set_total_entries(len);
    }

    // == Peek ==
    /// Returns the live cached value for `key` without updating statistics
    /// or recency.
    pub fn peek(&self, key: &ShortKey) -> Option<Cached> {
        let state = self.state.lock();
        state
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(Instant::now()))
            .map(|entry| entry.record.clone())
    }

    pub fn put_tombstone(&self, key: ShortKey, ttl: Duration) {
        self.put(key, Cached::Tombstone, ttl);
    }

    // == Invalidate ==
    /// Removes the entry for `key`. Returns whether one was present.
    pub fn invalidate(&self, key: &ShortKey) -> bool {
        self.state.lock().remove(key)
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub fn cleanup_expired(&self) -> usize {
        let mut state = self.state.lock();
        let now = Instant::now();

        let expired: Vec<ShortKey> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            state.remove(key);
        }
        state.stats.record_expirations(expired.len());
        expired.len()
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.entries.len());
        stats
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LinkRecord;
    use std::sync::Arc;
    use url::Url;

    const TTL: Duration = Duration::from_secs(300);

    fn key(raw: &str) -> ShortKey {
        ShortKey::new(raw).unwrap()
    }

    fn link(raw: &str) -> Cached {
        Cached::Link(Arc::new(LinkRecord::new(
            key(raw),
            Url::parse(&format!("https://example.com/{}", raw)).unwrap(),
        )))
    }

    #[test]
    fn test_cache_new() {
        let cache = ResolutionCache::new(100);
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 100);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let cache = ResolutionCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.put(key("a"), link("a"), TTL);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_and_get() {
        let cache = ResolutionCache::new(100);
        cache.put(key("key1"), link("key1"), TTL);

        let entry = cache.get(&key("key1")).unwrap();
        assert_eq!(entry.record, link("key1"));
        assert_eq!(entry.ttl, TTL);
    }

    #[test]
    fn test_get_absent() {
        let cache = ResolutionCache::new(100);
        assert!(cache.get(&key("nope")).is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_tombstone_roundtrip() {
        let cache = ResolutionCache::new(100);
        cache.put_tombstone(key("gone"), Duration::from_secs(5));

        let entry = cache.get(&key("gone")).unwrap();
        assert!(entry.record.is_tombstone());
        assert_eq!(cache.stats().negative_hits, 1);
    }

    #[test]
    fn test_replace_on_refresh() {
        let cache = ResolutionCache::new(100);
        cache.put_tombstone(key("k"), Duration::from_secs(5));
        cache.put(key("k"), link("k"), TTL);

        assert_eq!(cache.len(), 1);
        assert!(!cache.get(&key("k")).unwrap().record.is_tombstone());
    }

    #[test]
    fn test_peek_leaves_stats_and_order() {
        let cache = ResolutionCache::new(2);
        cache.put(key("a"), link("a"), TTL);
        cache.put(key("b"), link("b"), TTL);

        assert_eq!(cache.peek(&key("a")), Some(link("a")));
        assert_eq!(cache.peek(&key("zzz")), None);
        let stats = cache.stats();
        assert_eq!(stats.hits + stats.misses, 0);

        cache.put(key("c"), link("c"), TTL);
        assert_eq!(cache.peek(&key("a")), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_peek_skips_expired() {
        let cache = ResolutionCache::new(10);
        cache.put_tombstone(key("t"), Duration::from_secs(1));

        tokio::time::advance(Duration::from_secs(1)).await;

        assert_eq!(cache.peek(&key("t")), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lazy_expiry_removes_entry() {
        let cache = ResolutionCache::new(100);
        cache.put(key("key1"), link("key1"), Duration::from_secs(1));
        assert!(cache.get(&key("key1")).is_some());

        tokio::time::advance(Duration::from_secs(1)).await;

        assert!(cache.get(&key("key1")).is_none());
        assert!(cache.is_empty());
        assert_eq!(cache.stats().expirations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tombstone_expires_before_link() {
        let cache = ResolutionCache::new(100);
        cache.put(key("live"), link("live"), Duration::from_secs(300));
        cache.put_tombstone(key("dead"), Duration::from_secs(30));

        tokio::time::advance(Duration::from_secs(31)).await;

        assert!(cache.get(&key("dead")).is_none());
        assert!(cache.get(&key("live")).is_some());
    }

    #[test]
    fn test_lru_eviction() {
        let cache = ResolutionCache::new(3);
        cache.put(key("key1"), link("key1"), TTL);
        cache.put(key("key2"), link("key2"), TTL);
        cache.put(key("key3"), link("key3"), TTL);

        cache.put(key("key4"), link("key4"), TTL);

        assert_eq!(cache.len(), 3);
        assert!(cache.get(&key("key1")).is_none());
        assert!(cache.get(&key("key2")).is_some());
        assert!(cache.get(&key("key4")).is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_lru_touch_on_get() {
        let cache = ResolutionCache::new(3);
        cache.put(key("key1"), link("key1"), TTL);
        cache.put(key("key2"), link("key2"), TTL);
        cache.put(key("key3"), link("key3"), TTL);

        cache.get(&key("key1"));
        cache.put(key("key4"), link("key4"), TTL);

        assert!(cache.get(&key("key1")).is_some());
        assert!(cache.get(&key("key2")).is_none());
    }

    #[test]
    fn test_tombstones_share_capacity() {
        let cache = ResolutionCache::new(2);
        cache.put(key("hot"), link("hot"), TTL);

        for i in 0..10 {
            cache.put_tombstone(key(&format!("miss{}", i)), Duration::from_secs(5));
        }

        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let cache = ResolutionCache::new(2);
        cache.put(key("a"), link("a"), TTL);
        cache.put(key("b"), link("b"), TTL);
        cache.put(key("a"), link("a"), TTL);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_invalidate() {
        let cache = ResolutionCache::new(100);
        cache.put(key("key1"), link("key1"), TTL);

        assert!(cache.invalidate(&key("key1")));
        assert!(!cache.invalidate(&key("key1")));
        assert!(cache.get(&key("key1")).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_expired() {
        let cache = ResolutionCache::new(100);
        cache.put(key("short"), link("short"), Duration::from_secs(1));
        cache.put_tombstone(key("tomb"), Duration::from_secs(1));
        cache.put(key("long"), link("long"), Duration::from_secs(10));

        tokio::time::advance(Duration::from_millis(1100)).await;

        assert_eq!(cache.cleanup_expired(), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key("long")).is_some());
    }
}
