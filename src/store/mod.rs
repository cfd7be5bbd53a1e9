//! Link Store Module
//!
//! The durable key → destination mapping this service reads from, and the
//! record type it hands back.

mod memory;
mod record;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::key::ShortKey;

pub use memory::MemoryLinkStore;
pub use record::LinkRecord;

// == Store Error ==
/// Transport-level failures of the durable store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The lookup did not complete within the configured timeout
    #[error("store lookup timed out after {0:?}")]
    Timeout(Duration),

    /// The store answered with an error
    #[error("store backend error: {0}")]
    Backend(String),
}

// == Link Store Trait ==
/// Authoritative lookup of short keys.
///
/// # Implementations
///
/// - [`MemoryLinkStore`] - in-process map, optionally seeded from a JSON file
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Returns the record for `key`, `Ok(None)` if the key does not exist.
    async fn lookup(&self, key: &ShortKey) -> Result<Option<LinkRecord>, StoreError>;
}
