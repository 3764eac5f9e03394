// src/registry/pool.rs
use super::validate::partition_candidates;
use crate::storage::{Storage, StorageError};
use arc_swap::ArcSwap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Invalid URLs found: {}", invalid.join(", "))]
    Validation { invalid: Vec<String> },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The deduplicated, insertion-ordered set of monitored URLs.
///
/// Reads are served from an in-memory snapshot; every mutation is persisted
/// before the snapshot is replaced, so a failed write changes nothing.
pub struct UrlRegistry {
    storage: Arc<dyn Storage<String>>,
    urls: ArcSwap<Vec<String>>,
    write_lock: Mutex<()>,
}

impl UrlRegistry {
    /// Load the persisted list. Duplicates left behind by older writers are
    /// collapsed on load.
    pub async fn open(storage: Arc<dyn Storage<String>>) -> Result<Self, StorageError> {
        let stored = storage.load().await?;
        let urls = dedup(stored);

        tracing::info!("Loaded {} monitored URLs", urls.len());

        Ok(Self {
            storage,
            urls: ArcSwap::from_pointee(urls),
            write_lock: Mutex::new(()),
        })
    }

    pub fn list(&self) -> Vec<String> {
        self.urls.load().as_ref().clone()
    }

    pub fn snapshot(&self) -> Arc<Vec<String>> {
        self.urls.load_full()
    }

    pub fn len(&self) -> usize {
        self.urls.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.load().iter().any(|u| u == url)
    }

    /// Validate every candidate, then merge them in. Any invalid candidate
    /// rejects the whole call.
    pub async fn add<I, S>(&self, candidates: I) -> Result<Vec<String>, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (valid, invalid) = partition_candidates(candidates);
        if !invalid.is_empty() {
            tracing::warn!("Rejected {} invalid URLs: {:?}", invalid.len(), invalid);
            return Err(RegistryError::Validation { invalid });
        }

        let _guard = self.write_lock.lock().await;
        let current = self.urls.load_full();

        let merged = dedup(current.iter().cloned().chain(valid));
        let added = merged.len() - current.len();

        self.storage.save(&merged).await?;
        self.urls.store(Arc::new(merged.clone()));

        tracing::info!("Added {} new URLs ({} monitored)", added, merged.len());
        Ok(merged)
    }

    /// Remove an exact match. Removing an unknown URL is not an error.
    pub async fn remove(&self, url: &str) -> Result<Vec<String>, RegistryError> {
        let _guard = self.write_lock.lock().await;
        let current = self.urls.load_full();

        let updated: Vec<String> = current.iter().filter(|u| *u != url).cloned().collect();

        self.storage.save(&updated).await?;
        self.urls.store(Arc::new(updated.clone()));

        if updated.len() < current.len() {
            tracing::info!("Removed URL: {}", url);
        } else {
            tracing::debug!("Remove of unknown URL {} was a no-op", url);
        }
        Ok(updated)
    }
}

fn dedup(urls: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}
