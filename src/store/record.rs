//! Link Record
//!
//! A single key → destination mapping as held by the durable store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::key::ShortKey;

/// A short link as stored in the durable store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub key: ShortKey,
    pub destination: Url,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// None = never expires
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hit_count: u64,
}

impl LinkRecord {
    /// Creates a non-expiring record created now.
    pub fn new(key: ShortKey, destination: Url) -> Self {
        Self {
            key,
            destination,
            created_at: Utc::now(),
            expires_at: None,
            hit_count: 0,
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Checks if the link has passed its expiry at `now`.
    ///
    /// A link is expired once `now >= expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    /// Remaining lifetime at `now`, None if the record never expires.
    pub fn remaining_lifetime(&self, now: DateTime<Utc>) -> Option<std::time::Duration> {
        self.expires_at
            .map(|expires| (expires - now).to_std().unwrap_or_default())
    }
}
