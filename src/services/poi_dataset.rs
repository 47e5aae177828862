//! POI dataset loading: paginated source fetch, TTL cache, revalidation.

use crate::cache::{DatasetCache, DatasetDelta, RevalidationHandle};
use crate::constants::{MAX_POI_PAGES, POI_DATASET_CACHE_KEY};
use crate::error::{AppError, Result};
use crate::models::PointOfInterest;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};

/// Lifecycle of one dataset load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetState {
    Unloaded,
    LoadingFromSource,
    /// Terminal for this load; no network was touched.
    LoadedFromCache,
    LoadedFromSource {
        degraded: bool,
    },
    Revalidating,
    /// Source failed with zero accumulated items.
    Error,
}

/// A fully accumulated fetch from the source.
#[derive(Debug, Clone)]
pub struct DatasetFetch {
    pub items: Vec<PointOfInterest>,
    /// Pagination was interrupted; `items` holds what was accumulated.
    pub degraded: bool,
}

/// Where a served dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    Cache,
    Source,
}

#[derive(Debug, Clone)]
pub struct PoiDataset {
    pub items: Vec<PointOfInterest>,
    pub origin: LoadOrigin,
    pub degraded: bool,
}

/// Abstraction over the paginated POI listing endpoint, so the dataset
/// service can be exercised without a live source.
#[async_trait]
pub trait PoiSource: Send + Sync {
    async fn fetch_all(&self) -> Result<DatasetFetch>;
}

/// HTTP client for the POI data source. Consumes the listing endpoint in
/// fixed-size pages until `has_more` is false.
pub struct PoiSourceClient {
    client: Client,
    base_url: String,
    page_size: usize,
}

impl PoiSourceClient {
    pub fn new(base_url: String, page_size: usize) -> Self {
        PoiSourceClient {
            client: Client::new(),
            base_url,
            page_size,
        }
    }

    async fn fetch_page(&self, offset: usize) -> Result<PoiPage> {
        let url = format!("{}/pois", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("offset", offset.to_string()), ("limit", self.page_size.to_string())])
            .send()
            .await
            .map_err(|e| AppError::PoiSource(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::PoiSource(format!("HTTP {}", response.status())));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::PoiSource(format!("Failed to parse page: {}", e)))
    }
}

#[async_trait]
impl PoiSource for PoiSourceClient {
    /// Fetch the whole dataset page by page.
    ///
    /// Partial-failure policy: a failure after at least one item was
    /// accumulated returns the partial dataset flagged degraded rather than
    /// discarding everything. Only a failure with zero accumulated items is a
    /// hard error.
    async fn fetch_all(&self) -> Result<DatasetFetch> {
        let mut items: Vec<PointOfInterest> = Vec::new();
        let mut pages = 0;

        loop {
            if pages >= MAX_POI_PAGES {
                tracing::warn!(
                    "POI source still reporting more data after {} pages, stopping",
                    pages
                );
                return Ok(DatasetFetch {
                    items,
                    degraded: true,
                });
            }

            match self.fetch_page(items.len()).await {
                Ok(page) => {
                    let got = page.items.len();
                    items.extend(page.items);
                    pages += 1;

                    tracing::debug!(
                        "Fetched POI page {} ({} items, total {})",
                        pages,
                        got,
                        items.len()
                    );

                    if !page.has_more || got == 0 {
                        return Ok(DatasetFetch {
                            items,
                            degraded: false,
                        });
                    }
                }
                Err(e) if items.is_empty() => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        "POI pagination interrupted after {} items: {}. Keeping partial dataset.",
                        items.len(),
                        e
                    );
                    return Ok(DatasetFetch {
                        items,
                        degraded: true,
                    });
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct PoiPage {
    items: Vec<PointOfInterest>,
    has_more: bool,
}

/// Cache-first dataset loader with background revalidation.
#[derive(Clone)]
pub struct PoiDatasetService {
    source: Arc<dyn PoiSource>,
    cache: DatasetCache,
    state: Arc<RwLock<DatasetState>>,
}

impl PoiDatasetService {
    pub fn new(source: Arc<dyn PoiSource>, cache: DatasetCache) -> Self {
        PoiDatasetService {
            source,
            cache,
            state: Arc::new(RwLock::new(DatasetState::Unloaded)),
        }
    }

    pub async fn state(&self) -> DatasetState {
        *self.state.read().await
    }

    /// Load the dataset, cache-first.
    ///
    /// Cache hit: served with no network call. Miss: full paginated fetch;
    /// complete results are cached, degraded partials are served but not
    /// cached so the next load retries the source.
    pub async fn load(&self) -> Result<PoiDataset> {
        if let Some(items) = self.cache.load::<Vec<PointOfInterest>>(POI_DATASET_CACHE_KEY).await {
            *self.state.write().await = DatasetState::LoadedFromCache;
            tracing::debug!("POI dataset served from cache ({} items)", items.len());
            return Ok(PoiDataset {
                items,
                origin: LoadOrigin::Cache,
                degraded: false,
            });
        }

        self.load_from_source().await
    }

    /// Bypass the cache and refetch wholesale (explicit refresh).
    pub async fn refresh(&self) -> Result<PoiDataset> {
        self.load_from_source().await
    }

    async fn load_from_source(&self) -> Result<PoiDataset> {
        *self.state.write().await = DatasetState::LoadingFromSource;

        let fetch = match self.source.fetch_all().await {
            Ok(fetch) => fetch,
            Err(e) => {
                *self.state.write().await = DatasetState::Error;
                return Err(e);
            }
        };

        if fetch.degraded {
            tracing::warn!(
                "Serving degraded POI dataset ({} items), skipping cache write",
                fetch.items.len()
            );
        } else {
            self.cache.save(POI_DATASET_CACHE_KEY, &fetch.items).await;
        }

        *self.state.write().await = DatasetState::LoadedFromSource {
            degraded: fetch.degraded,
        };

        Ok(PoiDataset {
            items: fetch.items,
            origin: LoadOrigin::Source,
            degraded: fetch.degraded,
        })
    }

    /// Start background revalidation of the cached dataset. Every `interval`
    /// the source is refetched; complete results replace the cache wholesale
    /// and an item-count delta is emitted for the UI notice. The returned
    /// handle must be kept alive by the consuming context; dropping it
    /// cancels the timer.
    pub fn start_revalidation(
        &self,
        interval: Duration,
    ) -> (RevalidationHandle, mpsc::Receiver<DatasetDelta>) {
        let source = self.source.clone();
        let state = self.state.clone();

        self.cache.start_revalidation(
            POI_DATASET_CACHE_KEY,
            interval,
            move || {
                let source = source.clone();
                let state = state.clone();
                async move {
                    *state.write().await = DatasetState::Revalidating;
                    let result = source.fetch_all().await;

                    match result {
                        Ok(fetch) if !fetch.degraded => {
                            *state.write().await =
                                DatasetState::LoadedFromSource { degraded: false };
                            Ok(fetch.items)
                        }
                        Ok(fetch) => {
                            *state.write().await =
                                DatasetState::LoadedFromSource { degraded: true };
                            Err(AppError::PartialData {
                                kept: fetch.items.len(),
                                reason: "revalidation fetch incomplete".to_string(),
                            })
                        }
                        Err(e) => {
                            *state.write().await =
                                DatasetState::LoadedFromSource { degraded: true };
                            Err(e)
                        }
                    }
                }
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryDatasetStore;
    use crate::models::{Coordinates, PoiCategory};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn make_poi(name: &str) -> PointOfInterest {
        PointOfInterest::new(
            name.to_string(),
            PoiCategory::Museum,
            Coordinates::new(39.47, -0.38).unwrap(),
            4.5,
            300,
        )
    }

    fn make_cache() -> DatasetCache {
        DatasetCache::new(
            Arc::new(MemoryDatasetStore::new(3600, 100)),
            Duration::from_secs(3600),
        )
    }

    struct StubSource {
        fetches: AtomicUsize,
        result: fn() -> Result<DatasetFetch>,
    }

    #[async_trait]
    impl PoiSource for StubSource {
        async fn fetch_all(&self) -> Result<DatasetFetch> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    #[tokio::test]
    async fn cache_miss_loads_from_source_and_caches() {
        let source = Arc::new(StubSource {
            fetches: AtomicUsize::new(0),
            result: || {
                Ok(DatasetFetch {
                    items: vec![make_poi("a"), make_poi("b")],
                    degraded: false,
                })
            },
        });
        let service = PoiDatasetService::new(source.clone(), make_cache());

        let first = service.load().await.unwrap();
        assert_eq!(first.origin, LoadOrigin::Source);
        assert_eq!(first.items.len(), 2);
        assert!(!first.degraded);
        assert_eq!(
            service.state().await,
            DatasetState::LoadedFromSource { degraded: false }
        );

        // Second load is a cache hit: no further source fetch.
        let second = service.load().await.unwrap();
        assert_eq!(second.origin, LoadOrigin::Cache);
        assert_eq!(service.state().await, DatasetState::LoadedFromCache);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn degraded_fetch_served_but_not_cached() {
        let source = Arc::new(StubSource {
            fetches: AtomicUsize::new(0),
            result: || {
                Ok(DatasetFetch {
                    items: vec![make_poi("partial")],
                    degraded: true,
                })
            },
        });
        let service = PoiDatasetService::new(source.clone(), make_cache());

        let loaded = service.load().await.unwrap();
        assert!(loaded.degraded);
        assert_eq!(
            service.state().await,
            DatasetState::LoadedFromSource { degraded: true }
        );

        // Not cached, so the next load hits the source again.
        service.load().await.unwrap();
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn zero_item_failure_is_terminal_error() {
        let source = Arc::new(StubSource {
            fetches: AtomicUsize::new(0),
            result: || Err(AppError::PoiSource("connection refused".to_string())),
        });
        let service = PoiDatasetService::new(source, make_cache());

        assert!(service.load().await.is_err());
        assert_eq!(service.state().await, DatasetState::Error);
    }

    #[tokio::test]
    async fn refresh_bypasses_cache() {
        let source = Arc::new(StubSource {
            fetches: AtomicUsize::new(0),
            result: || {
                Ok(DatasetFetch {
                    items: vec![make_poi("x")],
                    degraded: false,
                })
            },
        });
        let service = PoiDatasetService::new(source.clone(), make_cache());

        service.load().await.unwrap();
        service.refresh().await.unwrap();
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn revalidation_reports_new_item_count() {
        let source = Arc::new(StubSource {
            fetches: AtomicUsize::new(0),
            result: || {
                Ok(DatasetFetch {
                    items: vec![make_poi("a"), make_poi("b"), make_poi("c")],
                    degraded: false,
                })
            },
        });
        let cache = make_cache();
        cache
            .save(POI_DATASET_CACHE_KEY, &vec![make_poi("a")])
            .await;
        let service = PoiDatasetService::new(source, cache);

        let (handle, mut rx) = service.start_revalidation(Duration::from_millis(20));
        let delta = rx.recv().await.unwrap();
        assert_eq!(delta.previous, 1);
        assert_eq!(delta.current, 3);
        assert_eq!(delta.new_items(), 2);
        handle.cancel();
    }
}
