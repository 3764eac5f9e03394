// src/history/store.rs
use crate::probe::ProbeResult;
use crate::storage::{Storage, StorageError};
use arc_swap::ArcSwap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub const DEFAULT_CAPACITY: usize = 1000;

/// Insertion-ordered log of probe results, capped globally.
///
/// Eviction is FIFO across all URLs together: a rarely checked URL can lose
/// its whole history to bursts of checks on other URLs.
pub struct HistoryStore {
    storage: Arc<dyn Storage<ProbeResult>>,
    capacity: usize,
    entries: ArcSwap<Vec<ProbeResult>>,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    pub async fn open(
        storage: Arc<dyn Storage<ProbeResult>>,
        capacity: usize,
    ) -> Result<Self, StorageError> {
        let mut entries = storage.load().await?;
        let evicted = truncate_front(&mut entries, capacity);
        if evicted > 0 {
            info!("Dropped {} stored results above capacity {}", evicted, capacity);
        }

        info!("Loaded {} historical results", entries.len());

        Ok(Self {
            storage,
            capacity,
            entries: ArcSwap::from_pointee(entries),
            write_lock: Mutex::new(()),
        })
    }

    /// Full contents, oldest first.
    pub fn all(&self) -> Vec<ProbeResult> {
        self.entries.load().as_ref().clone()
    }

    pub fn snapshot(&self) -> Arc<Vec<ProbeResult>> {
        self.entries.load_full()
    }

    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append `results` as one contiguous block, evict down to capacity and
    /// persist. Concurrent appends are serialized.
    pub async fn append(&self, results: &[ProbeResult]) -> Result<(), StorageError> {
        if results.is_empty() {
            return Ok(());
        }

        let _guard = self.write_lock.lock().await;

        let current = self.entries.load_full();
        let mut next = Vec::with_capacity((current.len() + results.len()).min(self.capacity));
        let overflow = (current.len() + results.len()).saturating_sub(self.capacity);

        if overflow >= current.len() {
            let skip = overflow - current.len();
            next.extend_from_slice(&results[skip..]);
        } else {
            next.extend_from_slice(&current[overflow..]);
            next.extend_from_slice(results);
        }

        self.storage.save(&next).await?;
        self.entries.store(Arc::new(next));

        debug!(
            "Appended {} results, evicted {} ({} retained)",
            results.len(),
            overflow,
            self.len()
        );
        Ok(())
    }
}

fn truncate_front<T>(entries: &mut Vec<T>, capacity: usize) -> usize {
    let overflow = entries.len().saturating_sub(capacity);
    entries.drain(..overflow);
    overflow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use proptest::prelude::*;

    fn result(i: usize) -> ProbeResult {
        ProbeResult::completed(format!("https://host{}.test", i % 3), 200, i as u64)
    }

    fn results(range: std::ops::Range<usize>) -> Vec<ProbeResult> {
        range.map(result).collect()
    }

    async fn store(capacity: usize) -> (HistoryStore, Arc<MemoryStorage<ProbeResult>>) {
        let storage = Arc::new(MemoryStorage::new());
        let store = HistoryStore::open(storage.clone(), capacity).await.unwrap();
        (store, storage)
    }

    #[tokio::test]
    async fn append_below_capacity_keeps_everything_in_order() {
        let (store, _) = store(DEFAULT_CAPACITY).await;

        store.append(&results(0..3)).await.unwrap();
        store.append(&results(3..5)).await.unwrap();

        let latencies: Vec<u64> = store.all().iter().map(|r| r.response_time_ms).collect();
        assert_eq!(latencies, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn append_past_capacity_keeps_most_recent() {
        let (store, storage) = store(DEFAULT_CAPACITY).await;

        store.append(&results(0..990)).await.unwrap();
        store.append(&results(990..1015)).await.unwrap();

        let all = store.all();
        assert_eq!(all.len(), 1000);
        assert_eq!(all.first().unwrap().response_time_ms, 15);
        assert_eq!(all.last().unwrap().response_time_ms, 1014);
        assert_eq!(storage.load().await.unwrap().len(), 1000);
    }

    #[tokio::test]
    async fn single_batch_larger_than_capacity_keeps_its_tail() {
        let (store, _) = store(10).await;
        store.append(&results(0..3)).await.unwrap();

        store.append(&results(3..28)).await.unwrap();

        let latencies: Vec<u64> = store.all().iter().map(|r| r.response_time_ms).collect();
        assert_eq!(latencies, (18..28).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn empty_append_does_not_persist() {
        let (store, storage) = store(10).await;

        store.append(&[]).await.unwrap();

        assert_eq!(storage.save_count(), 0);
    }

    #[tokio::test]
    async fn failed_persist_leaves_contents_unchanged() {
        let (store, storage) = store(10).await;
        store.append(&results(0..2)).await.unwrap();
        storage.set_fail_saves(true);

        assert!(store.append(&results(2..4)).await.is_err());
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn open_trims_oversized_file() {
        let storage = Arc::new(MemoryStorage::with_items(results(0..15)));
        let store = HistoryStore::open(storage, 10).await.unwrap();

        assert_eq!(store.len(), 10);
        assert_eq!(store.all()[0].response_time_ms, 5);
    }

    #[tokio::test]
    async fn concurrent_appends_stay_contiguous() {
        let (store, _) = store(DEFAULT_CAPACITY).await;
        let store = Arc::new(store);

        let tasks: Vec<_> = (0..8)
            .map(|batch| {
                let store = store.clone();
                tokio::spawn(async move {
                    let block = results(batch * 10..batch * 10 + 10);
                    store.append(&block).await.unwrap();
                })
            })
            .collect();
        futures::future::join_all(tasks).await;

        let all = store.all();
        assert_eq!(all.len(), 80);
        for block in all.chunks(10) {
            let first = block[0].response_time_ms;
            assert_eq!(first % 10, 0);
            for (offset, entry) in block.iter().enumerate() {
                assert_eq!(entry.response_time_ms, first + offset as u64);
            }
        }
    }

    proptest! {
        #[test]
        fn keeps_the_last_capacity_entries_in_append_order(
            capacity in 1usize..20,
            batches in prop::collection::vec(0usize..15, 0..6),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            let (kept, total) = runtime.block_on(async {
                let (store, _) = store(capacity).await;
                let mut next = 0;
                for size in &batches {
                    store.append(&results(next..next + size)).await.unwrap();
                    next += size;
                }
                (store.all(), next)
            });

            prop_assert_eq!(kept.len(), total.min(capacity));
            let latencies: Vec<u64> = kept.iter().map(|r| r.response_time_ms).collect();
            let expected: Vec<u64> = (total.saturating_sub(capacity)..total)
                .map(|i| i as u64)
                .collect();
            prop_assert_eq!(latencies, expected);
        }
    }
}
