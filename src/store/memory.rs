//! In-memory link store.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{LinkRecord, LinkStore, StoreError};
use crate::key::ShortKey;

/// A [`LinkStore`] backed by a process-local map.
#[derive(Debug, Default)]
pub struct MemoryLinkStore {
    links: RwLock<HashMap<ShortKey, LinkRecord>>,
}

impl MemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = LinkRecord>) -> Self {
        let links = records
            .into_iter()
            .map(|record| (record.key.clone(), record))
            .collect();
        Self {
            links: RwLock::new(links),
        }
    }

    /// Loads a JSON array of [`LinkRecord`]s.
    pub async fn load_json(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = tokio::fs::read(path.as_ref()).await?;
        let records: Vec<LinkRecord> = serde_json::from_slice(&raw)?;
        debug!("Loaded {} links from {}", records.len(), path.as_ref().display());
        Ok(Self::from_records(records))
    }

    /// Inserts or replaces a record, returning the previous one.
    pub async fn insert(&self, record: LinkRecord) -> Option<LinkRecord> {
        self.links.write().await.insert(record.key.clone(), record)
    }

    pub async fn remove(&self, key: &ShortKey) -> Option<LinkRecord> {
        self.links.write().await.remove(key)
    }

    pub async fn len(&self) -> usize {
        self.links.read().await.len()
    }
}

#[async_trait]
impl LinkStore for MemoryLinkStore {
    async fn lookup(&self, key: &ShortKey) -> Result<Option<LinkRecord>, StoreError> {
        Ok(self.links.read().await.get(key).cloned())
    }
}
