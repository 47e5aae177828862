use crate::error::{AppError, Result};
use crate::models::{QualityTier, TieredPoi};
use crate::AppState;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct ListPoisQuery {
    pub min_tier: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PoiListResponse {
    pub pois: Vec<TieredPoi>,
    pub degraded: bool,
}

/// `GET /pois?min_tier=` — the full tiered dataset, cache-first.
pub async fn list_pois(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListPoisQuery>,
) -> Result<Json<PoiListResponse>> {
    let min_tier = match query.min_tier.as_deref() {
        Some(raw) => Some(raw.parse::<QualityTier>().map_err(AppError::InvalidRequest)?),
        None => None,
    };

    let dataset = state.dataset.load().await?;
    let pois: Vec<TieredPoi> = dataset
        .items
        .into_iter()
        .map(TieredPoi::from)
        .filter(|p| min_tier.map_or(true, |min| p.tier.at_least(min)))
        .collect();

    Ok(Json(PoiListResponse {
        pois,
        degraded: dataset.degraded,
    }))
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub item_count: usize,
    pub degraded: bool,
}

/// `POST /pois/refresh` — explicit wholesale refresh, bypassing the cache.
pub async fn refresh_pois(State(state): State<Arc<AppState>>) -> Result<Json<RefreshResponse>> {
    let dataset = state.dataset.refresh().await?;
    tracing::info!(
        "POI dataset refreshed: {} items (degraded: {})",
        dataset.items.len(),
        dataset.degraded
    );

    Ok(Json(RefreshResponse {
        item_count: dataset.items.len(),
        degraded: dataset.degraded,
    }))
}
