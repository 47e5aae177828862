use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tripscout::cache::{DatasetCache, MemoryDatasetStore};
use tripscout::db::InMemoryTripRepository;
use tripscout::error::Result;
use tripscout::models::route::{RouteLeg, RouteRequest, RouteResult, RouteStep};
use tripscout::models::{Coordinates, LatLngBounds, PoiCategory, PointOfInterest};
use tripscout::services::geocoding::GeocodingClient;
use tripscout::services::poi_dataset::{DatasetFetch, PoiDatasetService, PoiSource};
use tripscout::services::route_planner::{RouteComputer, RoutePlanner};
use tripscout::AppState;

/// Deterministic directions stub: always returns the Madrid -> Valencia
/// route, so tests never touch the network.
pub struct StubDirections;

#[async_trait]
impl RouteComputer for StubDirections {
    async fn compute_route(&self, _request: &RouteRequest) -> Result<RouteResult> {
        Ok(madrid_valencia_route())
    }
}

pub fn madrid_valencia_route() -> RouteResult {
    let madrid = Coordinates::new(40.4168, -3.7038).unwrap();
    let cuenca = Coordinates::new(40.0704, -2.1374).unwrap();
    let valencia = Coordinates::new(39.4699, -0.3763).unwrap();
    let path = vec![madrid, cuenca, valencia];

    let leg = RouteLeg {
        distance_meters: 360_000.0,
        duration_seconds: 12_600.0,
        start_location: madrid,
        end_location: valencia,
        steps: vec![RouteStep {
            distance_meters: 360_000.0,
            duration_seconds: 12_600.0,
            start_location: madrid,
            end_location: valencia,
            path: path.clone(),
        }],
    };

    RouteResult {
        legs: vec![leg],
        bounds: LatLngBounds::enclosing(&path).unwrap(),
        overview_path: path,
        summary: "A-3".to_string(),
    }
}

/// POI source stub serving a small fixed dataset.
pub struct StubPoiSource;

#[async_trait]
impl PoiSource for StubPoiSource {
    async fn fetch_all(&self) -> Result<DatasetFetch> {
        Ok(DatasetFetch {
            items: sample_pois(),
            degraded: false,
        })
    }
}

pub fn sample_pois() -> Vec<PointOfInterest> {
    vec![
        // Diamond-tier POI right next to Valencia.
        PointOfInterest::new(
            "Ciudad de las Artes".to_string(),
            PoiCategory::Cultural,
            Coordinates::new(39.4700, -0.3800).unwrap(),
            4.9,
            1200,
        ),
        // Low-tier POI near the route midpoint.
        PointOfInterest::new(
            "Roadside Cafe".to_string(),
            PoiCategory::Cafe,
            Coordinates::new(40.0750, -2.1400).unwrap(),
            4.1,
            40,
        ),
        // Excellent POI far from the route; must never appear.
        PointOfInterest::new(
            "Alcazar de Sevilla".to_string(),
            PoiCategory::Historic,
            Coordinates::new(37.3831, -5.9900).unwrap(),
            4.9,
            5000,
        ),
    ]
}

pub fn setup_test_app() -> axum::Router {
    let cache = DatasetCache::new(
        Arc::new(MemoryDatasetStore::new(3600, 100)),
        Duration::from_secs(3600),
    );

    let state = Arc::new(AppState {
        planner: RoutePlanner::new(Arc::new(StubDirections)),
        geocoder: GeocodingClient::new("test-key".to_string()),
        dataset: PoiDatasetService::new(Arc::new(StubPoiSource), cache.clone()),
        cache,
        trip_repo: Arc::new(InMemoryTripRepository::new()),
        default_search_radius_m: 10_000.0,
    });

    tripscout::routes::create_router(state)
}
