use crate::cache::{CacheStats, DatasetStore};
use crate::error::Result;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// In-memory store backed by moka with TTL and bounded capacity.
/// All methods are `&self` — no locking needed.
///
/// The moka-level TTL is a backstop; the authoritative staleness check is
/// the timestamp inside each `CacheEntry`, applied by `DatasetCache::load`.
pub struct MemoryDatasetStore {
    entries: Cache<String, String>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryDatasetStore {
    pub fn new(ttl_seconds: u64, max_capacity: u64) -> Self {
        let entries = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        MemoryDatasetStore {
            entries,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl DatasetStore for MemoryDatasetStore {
    async fn get(&self, key: &str) -> Option<String> {
        match self.entries.get(key).await {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Memory cache hit: {}", key);
                Some(value)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Memory cache miss: {}", key);
                None
            }
        }
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value).await;
        Ok(())
    }

    async fn get_stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let hit_rate = if hits + misses > 0 {
            (hits as f64 / (hits + misses) as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            hits,
            misses,
            hit_rate,
            connected: true,
        }
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn miss_on_absent_key() {
        let store = MemoryDatasetStore::new(3600, 100);
        assert!(store.get("nonexistent").await.is_none());
    }

    #[tokio::test]
    async fn roundtrip() {
        let store = MemoryDatasetStore::new(3600, 100);
        store.put("key1", "payload".to_string()).await.unwrap();
        assert_eq!(store.get("key1").await.unwrap(), "payload");
    }

    #[tokio::test]
    async fn put_replaces_wholesale() {
        let store = MemoryDatasetStore::new(3600, 100);
        store.put("key1", "old".to_string()).await.unwrap();
        store.put("key1", "new".to_string()).await.unwrap();
        assert_eq!(store.get("key1").await.unwrap(), "new");
    }

    #[tokio::test]
    async fn stats_tracking() {
        let store = MemoryDatasetStore::new(3600, 100);
        store.put("key1", "v".to_string()).await.unwrap();

        // 1 miss
        store.get("missing").await;
        // 2 hits
        store.get("key1").await;
        store.get("key1").await;

        let stats = store.get_stats().await;
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate - 66.666).abs() < 1.0);
    }

    #[tokio::test]
    async fn health_always_true() {
        let store = MemoryDatasetStore::new(3600, 100);
        assert!(store.health_check().await);
        assert_eq!(store.backend_name(), "memory");
    }

    #[tokio::test]
    async fn ttl_expiry() {
        let store = MemoryDatasetStore::new(1, 100); // 1 second TTL
        store.put("key1", "v".to_string()).await.unwrap();
        assert!(store.get("key1").await.is_some());

        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(store.get("key1").await.is_none());
    }
}
