// src/storage/memory.rs
use super::{Storage, StorageError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// In-process storage; nothing survives a restart.
#[derive(Debug)]
pub struct MemoryStorage<T> {
    items: RwLock<Vec<T>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl<T> MemoryStorage<T> {
    pub fn new() -> Self {
        Self::with_items(Vec::new())
    }

    pub fn with_items(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
            saves: AtomicUsize::new(0),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Number of successful `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }

    /// Make subsequent saves fail, to exercise persistence error paths.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::Relaxed);
    }
}

impl<T> Default for MemoryStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> Storage<T> for MemoryStorage<T>
where
    T: Clone + Send + Sync,
{
    async fn load(&self) -> Result<Vec<T>, StorageError> {
        Ok(self.items.read().await.clone())
    }

    async fn save(&self, items: &[T]) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::Relaxed) {
            return Err(StorageError::Unavailable(
                "memory storage is set to fail".to_string(),
            ));
        }

        let mut stored = self.items.write().await;
        *stored = items.to_vec();
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
