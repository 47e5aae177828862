pub mod debug;
pub mod geocode;
pub mod pois;
pub mod trips;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/trips/plan", post(trips::plan_route))
        .route("/trips", post(trips::save_trip).get(trips::list_trips))
        .route("/trips/{id}", get(trips::get_trip).delete(trips::delete_trip))
        .route("/trips/{id}/route", get(trips::replay_trip))
        .route("/trips/{id}/pois", get(trips::trip_pois))
        .route("/pois", get(pois::list_pois))
        .route("/pois/refresh", post(pois::refresh_pois))
        .route("/geocode", get(geocode::geocode))
        .route("/geocode/reverse", get(geocode::reverse_geocode))
        .route("/debug/health", get(debug::health_check))
        .with_state(state)
}
