use crate::error::{AppError, Result};
use crate::models::Coordinates;
use reqwest::Client;
use serde::Deserialize;

const GEOCODING_BASE_URL: &str = "https://api.tripdirections.io/v1/geocode";

/// Wrapper for the external geocoder. Resolves free-text origin/destination
/// input to coordinates and back; shares the directions provider's status
/// taxonomy.
#[derive(Clone)]
pub struct GeocodingClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeocodingClient {
    pub fn new(api_key: String) -> Self {
        GeocodingClient {
            client: Client::new(),
            api_key,
            base_url: GEOCODING_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        GeocodingClient {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    /// Forward geocoding: address text to coordinates.
    pub async fn geocode(&self, address: &str) -> Result<Coordinates> {
        if address.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "address must not be empty".to_string(),
            ));
        }

        let body = self
            .request(&[("address", address)])
            .await?;

        let first = body
            .results
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("No match for '{}'", address)))?;

        Coordinates::new(first.lat, first.lng)
            .map_err(|e| AppError::GeocodingApi(format!("invalid coordinate in response: {}", e)))
    }

    /// Reverse geocoding: coordinates to the nearest address text.
    pub async fn reverse_geocode(&self, location: &Coordinates) -> Result<String> {
        let latlng = format!("{},{}", location.lat, location.lng);
        let body = self.request(&[("latlng", latlng.as_str())]).await?;

        body.results
            .into_iter()
            .next()
            .and_then(|r| r.formatted_address)
            .ok_or_else(|| AppError::NotFound(format!("No address at {:?}", location)))
    }

    async fn request(&self, params: &[(&str, &str)]) -> Result<GeocodeApiResponse> {
        let response = self
            .client
            .get(&self.base_url)
            .query(params)
            .query(&[("key", &self.api_key)])
            .send()
            .await
            .map_err(|e| AppError::GeocodingApi(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::GeocodingApi(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: GeocodeApiResponse = response
            .json()
            .await
            .map_err(|e| AppError::GeocodingApi(format!("Failed to parse response: {}", e)))?;

        match body.status.as_str() {
            "OK" => Ok(body),
            "NOT_FOUND" | "ZERO_RESULTS" => Err(AppError::NotFound(
                "geocoder found no results".to_string(),
            )),
            other => Err(AppError::GeocodingApi(format!("provider status {}", other))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeApiResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    lat: f64,
    lng: f64,
    formatted_address: Option<String>,
}
