use crate::AppState;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

/// `GET /debug/health`
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let cache_healthy = state.cache.health_check().await;
    let stats = state.cache.stats().await;

    Json(json!({
        "status": "ok",
        "cache_backend": state.cache.backend_name(),
        "cache_connected": cache_healthy,
        "cache_hit_rate": stats.hit_rate,
    }))
}
