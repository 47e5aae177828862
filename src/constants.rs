//! Stable application-wide constants.
//!
//! Values here are structural invariants and default fallbacks for
//! env-var-based configuration. They should rarely change; runtime tuning
//! happens through [`Config`](crate::config::Config).

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "3000";

// --- Dataset cache defaults ---

/// Default POI dataset cache TTL: 24 hours. Overridden by `DATASET_CACHE_TTL`.
pub const DEFAULT_DATASET_CACHE_TTL_SECONDS: u64 = 86_400;
/// Default background revalidation interval: 10 minutes.
/// Overridden by `DATASET_REVALIDATE_INTERVAL`.
pub const DEFAULT_REVALIDATE_INTERVAL_SECONDS: u64 = 600;
/// Upper bound on entries held by the in-memory cache backend.
pub const DEFAULT_MEMORY_CACHE_MAX_ENTRIES: u64 = 1_000;
/// Cache key under which the full POI dataset is stored.
pub const POI_DATASET_CACHE_KEY: &str = "poi:dataset:v1";

// --- POI source pagination ---

/// Page size for the paginated POI listing endpoint.
/// Overridden by `POI_PAGE_SIZE`.
pub const DEFAULT_POI_PAGE_SIZE: usize = 200;
/// Hard cap on pages consumed in one full-dataset fetch. The dataset is
/// low-thousands of items; hitting this means the source is misbehaving.
pub const MAX_POI_PAGES: usize = 100;

// --- Route planning structural limits ---

/// Maximum intermediate waypoints accepted per route request (provider limit).
pub const MAX_WAYPOINTS: usize = 23;
/// Default proximity search radius in meters. Overridden per request.
pub const DEFAULT_SEARCH_RADIUS_METERS: f64 = 10_000.0;
/// Upper bound on the per-request proximity radius (meters).
pub const MAX_SEARCH_RADIUS_METERS: f64 = 100_000.0;
/// Snapshot endpoints further than this from the requested origin or
/// destination invalidate the snapshot and force a fresh computation.
pub const SNAPSHOT_ENDPOINT_TOLERANCE_KM: f64 = 1.0;

// --- Proximity search scheduling ---

/// POIs scanned between cooperative yields in the async proximity search.
pub const PROXIMITY_YIELD_BATCH: usize = 256;
