use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Directions API error: {0}")]
    DirectionsApi(String),

    #[error("Geocoding API error: {0}")]
    GeocodingApi(String),

    #[error("POI source error: {0}")]
    PoiSource(String),

    #[error("No route found: {0}")]
    RouteNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid route snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Partial dataset: {kept} items kept after source failure: {reason}")]
    PartialData { kept: usize, reason: String },

    #[error("Route request superseded by a newer request")]
    Superseded,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

// Convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal database error")
            }
            AppError::DirectionsApi(ref e) => {
                tracing::error!("Directions API error: {}", e);
                (StatusCode::BAD_GATEWAY, "Routing service error")
            }
            AppError::GeocodingApi(ref e) => {
                tracing::error!("Geocoding API error: {}", e);
                (StatusCode::BAD_GATEWAY, "Geocoding service error")
            }
            AppError::PoiSource(ref e) => {
                tracing::error!("POI source error: {}", e);
                (StatusCode::BAD_GATEWAY, "POI data source error")
            }
            AppError::RouteNotFound(ref e) => {
                tracing::info!("No route found: {}", e);
                (StatusCode::NOT_FOUND, "No route found between these points")
            }
            AppError::InvalidRequest(ref e) => (StatusCode::BAD_REQUEST, e.as_str()),
            AppError::InvalidSnapshot(ref e) => {
                tracing::warn!("Invalid route snapshot: {}", e);
                (StatusCode::UNPROCESSABLE_ENTITY, "Stored route is not replayable")
            }
            AppError::Cache(ref e) => {
                tracing::warn!("Cache error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Cache error")
            }
            AppError::PartialData { kept, ref reason } => {
                tracing::warn!("Partial dataset kept ({} items): {}", kept, reason);
                (StatusCode::PARTIAL_CONTENT, "Partial dataset")
            }
            AppError::Superseded => {
                tracing::debug!("Route request superseded");
                (StatusCode::CONFLICT, "Superseded by a newer request")
            }
            AppError::NotFound(ref e) => (StatusCode::NOT_FOUND, e.as_str()),
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": status.canonical_reason().unwrap_or("Unknown error"),
            "message": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
