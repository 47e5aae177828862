use crate::constants::MAX_SEARCH_RADIUS_METERS;
use crate::db::TripRecord;
use crate::error::{AppError, Result};
use crate::models::route::{RouteRequest, RouteResult};
use crate::models::{QualityTier, RouteSnapshot, TieredPoi};
use crate::services::proximity;
use crate::services::route_planner::PlannedRoute;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

/// `POST /trips/plan` — compute a fresh route for the given request.
pub async fn plan_route(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RouteRequest>,
) -> Result<Json<PlannedRoute>> {
    let planned = state.planner.plan(&request, None).await?;
    Ok(Json(planned))
}

#[derive(Debug, Deserialize)]
pub struct SaveTripRequest {
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub route: RouteRequest,
}

/// `POST /trips` — plan and persist a trip. The computed geometry is encoded
/// into a snapshot at save time so later replays skip the provider.
pub async fn save_trip(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SaveTripRequest>,
) -> Result<(StatusCode, Json<TripRecord>)> {
    if request.name.trim().is_empty() {
        return Err(AppError::InvalidRequest("name must not be empty".to_string()));
    }

    let planned = state.planner.plan(&request.route, None).await?;
    let route = &planned.route;

    let trip = TripRecord {
        id: Uuid::new_v4(),
        owner: request.owner,
        name: request.name,
        description: request.description,
        origin: request.route.origin.clone(),
        destination: request.route.destination.clone(),
        waypoints: request.route.waypoints.clone(),
        distance_km: route.distance_km(),
        duration_minutes: route.duration_minutes() as i32,
        geometry: RouteSnapshot::encode(route),
        created_at: OffsetDateTime::now_utc(),
    };

    state.trip_repo.insert(&trip).await?;
    tracing::info!("Saved trip {} ({:.1}km)", trip.id, trip.distance_km);

    Ok((StatusCode::CREATED, Json(trip)))
}

/// `GET /trips/{id}`
pub async fn get_trip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TripRecord>> {
    let trip = find_trip(&state, id).await?;
    Ok(Json(trip))
}

#[derive(Debug, Deserialize)]
pub struct ListTripsQuery {
    pub owner: String,
}

/// `GET /trips?owner=`
pub async fn list_trips(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListTripsQuery>,
) -> Result<Json<Vec<TripRecord>>> {
    let trips = state.trip_repo.list_for_owner(&query.owner).await?;
    Ok(Json(trips))
}

/// `GET /trips/{id}/route` — replay the saved route from its snapshot; on a
/// malformed snapshot the planner falls back to a fresh computation.
pub async fn replay_trip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlannedRoute>> {
    let trip = find_trip(&state, id).await?;
    let request = trip_request(&trip);

    let planned = state.planner.plan(&request, Some(&trip.geometry)).await?;
    Ok(Json(planned))
}

/// `DELETE /trips/{id}` — removes the record and its owned snapshot.
pub async fn delete_trip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if state.trip_repo.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("trip {}", id)))
    }
}

#[derive(Debug, Deserialize)]
pub struct TripPoisQuery {
    pub radius_m: Option<f64>,
    pub min_tier: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TripPoisResponse {
    pub pois: Vec<TieredPoi>,
    /// The backing dataset was incomplete when this answer was computed.
    pub degraded: bool,
}

/// `GET /trips/{id}/pois?radius_m=&min_tier=` — POIs near the trip's route,
/// tagged with their quality tier.
pub async fn trip_pois(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<TripPoisQuery>,
) -> Result<Json<TripPoisResponse>> {
    let radius_m = query.radius_m.unwrap_or(state.default_search_radius_m);
    if !(0.0..=MAX_SEARCH_RADIUS_METERS).contains(&radius_m) {
        return Err(AppError::InvalidRequest(format!(
            "radius_m must be between 0 and {}",
            MAX_SEARCH_RADIUS_METERS
        )));
    }

    let min_tier = match query.min_tier.as_deref() {
        Some(raw) => Some(raw.parse::<QualityTier>().map_err(AppError::InvalidRequest)?),
        None => None,
    };

    let trip = find_trip(&state, id).await?;
    let route = resolve_route(&state, &trip).await?;

    // Proximity search only runs once a route has resolved.
    let dataset = state.dataset.load().await?;
    let nearby =
        proximity::find_near_yielding(&route.overview_path, &dataset.items, radius_m).await;

    let pois: Vec<TieredPoi> = nearby
        .into_iter()
        .map(TieredPoi::from)
        .filter(|p| min_tier.map_or(true, |min| p.tier.at_least(min)))
        .collect();

    tracing::debug!(
        "Trip {}: {} POIs within {:.0}m (min tier {:?})",
        id,
        pois.len(),
        radius_m,
        min_tier
    );

    Ok(Json(TripPoisResponse {
        pois,
        degraded: dataset.degraded,
    }))
}

async fn find_trip(state: &AppState, id: Uuid) -> Result<TripRecord> {
    state
        .trip_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("trip {}", id)))
}

fn trip_request(trip: &TripRecord) -> RouteRequest {
    RouteRequest {
        origin: trip.origin.clone(),
        destination: trip.destination.clone(),
        waypoints: trip.waypoints.clone(),
        mode: Default::default(),
    }
}

async fn resolve_route(state: &AppState, trip: &TripRecord) -> Result<RouteResult> {
    let request = trip_request(trip);
    let planned = state.planner.plan(&request, Some(&trip.geometry)).await?;
    Ok(planned.route)
}
