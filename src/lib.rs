// Library exports for testing and reusability

pub mod cache;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use error::{AppError, Result};

use crate::cache::DatasetCache;
use crate::services::geocoding::GeocodingClient;
use crate::services::poi_dataset::PoiDatasetService;
use crate::services::route_planner::RoutePlanner;
use std::sync::Arc;

// App state for sharing across the application
pub struct AppState {
    pub planner: RoutePlanner,
    pub geocoder: GeocodingClient,
    pub dataset: PoiDatasetService,
    pub cache: DatasetCache,
    pub trip_repo: Arc<dyn db::TripRepository>,
    pub default_search_radius_m: f64,
}
