use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tripscout::cache::{DatasetCache, DatasetStore, MemoryDatasetStore, RedisDatasetStore};
use tripscout::config::Config;
use tripscout::constants::DEFAULT_MEMORY_CACHE_MAX_ENTRIES;
use tripscout::db::PgTripRepository;
use tripscout::services::directions::{AuthMode, DirectionsClient};
use tripscout::services::geocoding::GeocodingClient;
use tripscout::services::poi_dataset::{PoiDatasetService, PoiSourceClient};
use tripscout::services::route_planner::RoutePlanner;
use tripscout::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tripscout=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting tripscout API server");

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = tripscout::db::create_pool(&config.database_url).await?;
    tracing::info!("Database connection established");

    // Run migrations
    sqlx::migrate!("./migrations").run(&db_pool).await?;
    tracing::info!("Database migrations completed");

    // Initialize cache store: try Redis, fall back to in-memory
    let store: Arc<dyn DatasetStore> = if let Some(ref redis_url) = config.redis_url {
        tracing::info!("Connecting to Redis cache...");
        match RedisDatasetStore::new(redis_url, config.dataset_cache_ttl).await {
            Ok(redis_store) => Arc::new(redis_store),
            Err(e) => {
                tracing::warn!(
                    "Failed to connect to Redis: {}. Falling back to in-memory cache.",
                    e
                );
                Arc::new(MemoryDatasetStore::new(
                    config.dataset_cache_ttl,
                    DEFAULT_MEMORY_CACHE_MAX_ENTRIES,
                ))
            }
        }
    } else {
        tracing::info!("Redis URL not configured. Using in-memory cache.");
        Arc::new(MemoryDatasetStore::new(
            config.dataset_cache_ttl,
            DEFAULT_MEMORY_CACHE_MAX_ENTRIES,
        ))
    };
    let cache = DatasetCache::new(store, Duration::from_secs(config.dataset_cache_ttl));

    // Initialize services
    let directions_client = if let Some(ref base_url) = config.directions_base_url {
        DirectionsClient::with_config(
            config.directions_api_key.clone(),
            base_url.clone(),
            AuthMode::BearerHeader,
        )
    } else {
        DirectionsClient::new(config.directions_api_key.clone())
    };
    let geocoder = if let Some(ref base_url) = config.geocoding_base_url {
        GeocodingClient::with_base_url(config.directions_api_key.clone(), base_url.clone())
    } else {
        GeocodingClient::new(config.directions_api_key.clone())
    };

    let poi_source = Arc::new(PoiSourceClient::new(
        config.poi_source_base_url.clone(),
        config.poi_page_size,
    ));
    let dataset = PoiDatasetService::new(poi_source, cache.clone());

    // Background revalidation of the POI dataset. The handle lives for the
    // whole server lifetime here; dropping it on shutdown cancels the timer.
    let (revalidation, mut deltas) =
        dataset.start_revalidation(Duration::from_secs(config.revalidate_interval));
    tokio::spawn(async move {
        while let Some(delta) = deltas.recv().await {
            if delta.new_items() > 0 {
                tracing::info!("POI dataset revalidated: {} new items", delta.new_items());
            }
        }
    });

    let planner = RoutePlanner::new(Arc::new(directions_client));
    let trip_repo: Arc<dyn tripscout::db::TripRepository> =
        Arc::new(PgTripRepository::new(db_pool));

    // Create application state
    let state = Arc::new(AppState {
        planner,
        geocoder,
        dataset,
        cache,
        trip_repo,
        default_search_radius_m: config.default_search_radius_m,
    });

    // Build router with CORS and tracing
    let app = Router::new()
        .nest("/api/v1", tripscout::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    drop(revalidation);
    Ok(())
}
