//! Dataset caching.
//!
//! A [`DatasetStore`] is a plain string-keyed JSON store (in-memory moka or
//! Redis, selected at startup). [`DatasetCache`] layers the TTL and
//! background-revalidation semantics on top: entries are wrapped in a
//! timestamped envelope, replaced wholesale on every write (last-writer-wins,
//! never merged), and treated as a miss once their age reaches the TTL.
//!
//! Caching is an optimization, not a correctness requirement: `save` absorbs
//! every backend failure after logging it.

mod memory;
mod redis;

pub use memory::MemoryDatasetStore;
pub use redis::RedisDatasetStore;

use crate::error::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Backend-agnostic key-value store for JSON payloads.
#[async_trait]
pub trait DatasetStore: Send + Sync {
    /// Raw value for `key`, or `None` on absence or backend error.
    async fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`. Errors are returned so the caller can
    /// decide whether they matter; `DatasetCache::save` absorbs them.
    async fn put(&self, key: &str, value: String) -> Result<()>;

    async fn get_stats(&self) -> CacheStats;

    async fn health_check(&self) -> bool;

    fn backend_name(&self) -> &'static str;
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub connected: bool,
}

/// Timestamped envelope persisted for every cached dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    /// Unix seconds at write time.
    pub timestamp: i64,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T) -> Self {
        CacheEntry {
            data,
            timestamp: OffsetDateTime::now_utc().unix_timestamp(),
        }
    }

    pub fn age_seconds(&self, now: i64) -> i64 {
        now - self.timestamp
    }
}

/// Item-count change reported after each successful revalidation, so the
/// consumer can surface an "N new items" notice.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DatasetDelta {
    pub previous: usize,
    pub current: usize,
}

impl DatasetDelta {
    pub fn new_items(&self) -> i64 {
        self.current as i64 - self.previous as i64
    }
}

/// Owner handle for a background revalidation task. The task is aborted on
/// `cancel()` or when the handle is dropped, so a torn-down consumer can
/// never leave an orphaned timer issuing network fetches.
pub struct RevalidationHandle {
    task: JoinHandle<()>,
}

impl RevalidationHandle {
    pub fn cancel(self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for RevalidationHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// TTL-based dataset cache with background revalidation.
#[derive(Clone)]
pub struct DatasetCache {
    store: Arc<dyn DatasetStore>,
    ttl: Duration,
}

impl DatasetCache {
    pub fn new(store: Arc<dyn DatasetStore>, ttl: Duration) -> Self {
        DatasetCache { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.get_stats().await
    }

    pub async fn health_check(&self) -> bool {
        self.store.health_check().await
    }

    /// Load a dataset. A miss is returned when the key is absent, the stored
    /// payload cannot be parsed, or the entry's age is at or past the TTL
    /// (an entry exactly at the TTL boundary is already stale).
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(key).await?;

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Discarding unparseable cache entry for {}: {}", key, e);
                return None;
            }
        };

        let now = OffsetDateTime::now_utc().unix_timestamp();
        let age = entry.age_seconds(now);
        if age < 0 || age as u64 >= self.ttl.as_secs() {
            tracing::debug!("Cache entry for {} expired (age {}s)", key, age);
            return None;
        }

        tracing::debug!("Cache hit for {} (age {}s)", key, age);
        Some(entry.data)
    }

    /// Best-effort save. Storage failures (quota, connectivity) are logged
    /// and swallowed; they must never fail the caller.
    pub async fn save<T: Serialize>(&self, key: &str, data: &T) {
        let entry = CacheEntry::new(data);
        let json = match serde_json::to_string(&entry) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!("Failed to serialize dataset for cache key {}: {}", key, e);
                return;
            }
        };

        if let Err(e) = self.store.put(key, json).await {
            tracing::warn!("Failed to cache dataset under {}: {}", key, e);
        }
    }

    /// Spawn a background task that re-fetches the full dataset every
    /// `interval`, replaces the cached value wholesale on success, and emits
    /// a [`DatasetDelta`] per successful pass. Fetch failures leave the
    /// previous entry in place and are only logged.
    ///
    /// The returned handle owns the task; dropping it cancels revalidation.
    pub fn start_revalidation<T, F, Fut>(
        &self,
        key: &str,
        interval: Duration,
        fetch: F,
    ) -> (RevalidationHandle, mpsc::Receiver<DatasetDelta>)
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Vec<T>>> + Send,
    {
        let cache = self.clone();
        let key = key.to_string();
        let (tx, rx) = mpsc::channel(8);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of a tokio interval fires immediately; the
            // initial load already happened, so skip it.
            ticker.tick().await;

            loop {
                ticker.tick().await;

                match fetch().await {
                    Ok(items) => {
                        let previous = cache
                            .load::<Vec<T>>(&key)
                            .await
                            .map(|d| d.len())
                            .unwrap_or(0);
                        let current = items.len();

                        cache.save(&key, &items).await;
                        tracing::debug!(
                            "Revalidated {}: {} -> {} items",
                            key,
                            previous,
                            current
                        );

                        // Consumer gone means revalidation is orphaned; stop.
                        if tx.send(DatasetDelta { previous, current }).await.is_err() {
                            tracing::debug!("Revalidation consumer for {} dropped, stopping", key);
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Revalidation fetch for {} failed: {}", key, e);
                    }
                }
            }
        });

        (RevalidationHandle { task }, rx)
    }
}
