//! Shortlink Gateway - A short-link redirect service
//!
//! Resolves short keys through a TTL/LRU cache in front of a durable link
//! store and answers with 302 redirects.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod key;
pub mod resolver;
pub mod store;
pub mod tasks;

pub use api::{create_router, AppState, GatewayConfig};
pub use cache::ResolutionCache;
pub use config::Config;
pub use key::ShortKey;
pub use resolver::{LinkResolver, RedirectOutcome, ResolverConfig};
pub use store::{LinkRecord, LinkStore, MemoryLinkStore, StoreError};
pub use tasks::spawn_cleanup_task;
