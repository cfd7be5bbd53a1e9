//! Cache Module
//!
//! Provides in-memory caching of resolved links and tombstones with TTL
//! expiration and LRU eviction.

mod entry;
mod lru;
mod resolution;
mod stats;


// Re-export public types
pub use entry::{CacheEntry, Cached};
pub(crate) use lru::LruTracker;
pub use resolution::ResolutionCache;
pub use stats::CacheStats;
