use crate::error::{AppError, Result};
use crate::models::Coordinates;
use crate::AppState;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct GeocodeResponse {
    pub address: String,
    pub location: Coordinates,
}

/// `GET /geocode?address=` — forward geocoding for free-text trip endpoints.
pub async fn geocode(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GeocodeQuery>,
) -> Result<Json<GeocodeResponse>> {
    let location = state.geocoder.geocode(&query.address).await?;
    Ok(Json(GeocodeResponse {
        address: query.address,
        location,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ReverseGeocodeQuery {
    pub lat: f64,
    pub lng: f64,
}

/// `GET /geocode/reverse?lat=&lng=`
pub async fn reverse_geocode(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReverseGeocodeQuery>,
) -> Result<Json<GeocodeResponse>> {
    let location =
        Coordinates::new(query.lat, query.lng).map_err(AppError::InvalidRequest)?;
    let address = state.geocoder.reverse_geocode(&location).await?;
    Ok(Json(GeocodeResponse { address, location }))
}
