use crate::error::{AppError, Result};
use crate::models::route::{RoutePoint, RouteRequest, RouteResult};
use crate::models::{Coordinates, LatLngBounds, RouteLeg, RouteStep};
use reqwest::Client;
use serde::Deserialize;

const DIRECTIONS_BASE_URL: &str = "https://api.tripdirections.io/v1/routes";

/// How the client authenticates with the directions API.
#[derive(Clone, Debug)]
pub enum AuthMode {
    /// Current default: send `key` query param (direct provider access).
    DirectToken,
    /// Proxy mode: send `Authorization: Bearer` header.
    BearerHeader,
}

/// Thin wrapper around the external directions provider.
///
/// This client has no side effects beyond the outbound call and performs no
/// retries; retry policy belongs to the caller. Waypoints are forwarded in
/// caller-supplied order and never reordered.
#[derive(Clone)]
pub struct DirectionsClient {
    client: Client,
    api_key: String,
    base_url: String,
    auth_mode: AuthMode,
}

impl DirectionsClient {
    pub fn new(api_key: String) -> Self {
        DirectionsClient {
            client: Client::new(),
            api_key,
            base_url: DIRECTIONS_BASE_URL.to_string(),
            auth_mode: AuthMode::DirectToken,
        }
    }

    pub fn with_config(api_key: String, base_url: String, auth_mode: AuthMode) -> Self {
        DirectionsClient {
            client: Client::new(),
            api_key,
            base_url,
            auth_mode,
        }
    }

    /// Compute a route for `request`.
    pub async fn compute_route(&self, request: &RouteRequest) -> Result<RouteResult> {
        request.validate().map_err(AppError::InvalidRequest)?;

        let waypoints_param = request
            .waypoints
            .iter()
            .map(format_point)
            .collect::<Vec<_>>()
            .join("|");

        tracing::debug!(
            waypoints = request.waypoints.len(),
            mode = %request.mode,
            "Directions request: {} -> {} via {} waypoints",
            request.origin.name,
            request.destination.name,
            request.waypoints.len()
        );

        let mut http_request = self.client.get(&self.base_url).query(&[
            ("origin", format_point(&request.origin)),
            ("destination", format_point(&request.destination)),
            ("mode", request.mode.provider_profile().to_string()),
        ]);

        if !waypoints_param.is_empty() {
            http_request = http_request.query(&[("waypoints", &waypoints_param)]);
        }

        match self.auth_mode {
            AuthMode::DirectToken => {
                http_request = http_request.query(&[("key", &self.api_key)]);
            }
            AuthMode::BearerHeader => {
                http_request = http_request.bearer_auth(&self.api_key);
            }
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| AppError::DirectionsApi(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                status = %status,
                "Directions API HTTP error {}: {}",
                status, error_text
            );
            return Err(AppError::DirectionsApi(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: DirectionsApiResponse = response
            .json()
            .await
            .map_err(|e| AppError::DirectionsApi(format!("Failed to parse response: {}", e)))?;

        map_provider_status(&body.status)?;

        let route = body.routes.into_iter().next().ok_or_else(|| {
            AppError::RouteNotFound(format!(
                "{} -> {}",
                request.origin.name, request.destination.name
            ))
        })?;

        let result = convert_route(route)?;
        tracing::debug!(
            distance_km = %format!("{:.2}", result.distance_km()),
            duration_min = result.duration_minutes(),
            path_points = result.overview_path.len(),
            "Directions response: {:.2}km, {}min, {} path points",
            result.distance_km(), result.duration_minutes(), result.overview_path.len()
        );
        Ok(result)
    }
}

fn format_point(point: &RoutePoint) -> String {
    format!("{},{}", point.lat, point.lng)
}

/// Map the provider's status taxonomy onto ours.
fn map_provider_status(status: &str) -> Result<()> {
    match status {
        "OK" => Ok(()),
        "NOT_FOUND" | "ZERO_RESULTS" => Err(AppError::RouteNotFound(format!(
            "provider status {}",
            status
        ))),
        "OVER_QUERY_LIMIT" | "REQUEST_DENIED" | "UNKNOWN_ERROR" => Err(AppError::DirectionsApi(
            format!("provider status {}", status),
        )),
        other => Err(AppError::DirectionsApi(format!(
            "unrecognized provider status {}",
            other
        ))),
    }
}

fn convert_route(route: ProviderRoute) -> Result<RouteResult> {
    let overview_path = route
        .overview_path
        .iter()
        .map(convert_point)
        .collect::<Result<Vec<_>>>()?;

    if overview_path.is_empty() {
        return Err(AppError::DirectionsApi(
            "provider returned empty overview path".to_string(),
        ));
    }

    let legs = route
        .legs
        .into_iter()
        .map(convert_leg)
        .collect::<Result<Vec<_>>>()?;

    // Prefer provider bounds; derive from the path when absent.
    let bounds = match route.bounds {
        Some(b) => LatLngBounds {
            northeast: convert_point(&b.northeast)?,
            southwest: convert_point(&b.southwest)?,
        },
        None => LatLngBounds::enclosing(&overview_path)
            .ok_or_else(|| AppError::DirectionsApi("route has no geometry".to_string()))?,
    };

    Ok(RouteResult {
        legs,
        overview_path,
        bounds,
        summary: route.summary.unwrap_or_default(),
    })
}

fn convert_leg(leg: ProviderLeg) -> Result<RouteLeg> {
    Ok(RouteLeg {
        distance_meters: leg.distance_meters,
        duration_seconds: leg.duration_seconds,
        start_location: convert_point(&leg.start_location)?,
        end_location: convert_point(&leg.end_location)?,
        steps: leg
            .steps
            .into_iter()
            .map(|s| {
                Ok(RouteStep {
                    distance_meters: s.distance_meters,
                    duration_seconds: s.duration_seconds,
                    start_location: convert_point(&s.start_location)?,
                    end_location: convert_point(&s.end_location)?,
                    path: s.path.iter().map(convert_point).collect::<Result<Vec<_>>>()?,
                })
            })
            .collect::<Result<Vec<_>>>()?,
    })
}

fn convert_point(point: &ProviderPoint) -> Result<Coordinates> {
    Coordinates::new(point.lat, point.lng)
        .map_err(|e| AppError::DirectionsApi(format!("invalid coordinate in response: {}", e)))
}

// Provider response types

#[derive(Debug, Deserialize)]
struct DirectionsApiResponse {
    status: String,
    #[serde(default)]
    routes: Vec<ProviderRoute>,
}

#[derive(Debug, Deserialize)]
struct ProviderRoute {
    summary: Option<String>,
    bounds: Option<ProviderBounds>,
    overview_path: Vec<ProviderPoint>,
    legs: Vec<ProviderLeg>,
}

#[derive(Debug, Deserialize)]
struct ProviderBounds {
    northeast: ProviderPoint,
    southwest: ProviderPoint,
}

#[derive(Debug, Deserialize)]
struct ProviderLeg {
    distance_meters: f64,
    duration_seconds: f64,
    start_location: ProviderPoint,
    end_location: ProviderPoint,
    #[serde(default)]
    steps: Vec<ProviderStep>,
}

#[derive(Debug, Deserialize)]
struct ProviderStep {
    distance_meters: f64,
    duration_seconds: f64,
    start_location: ProviderPoint,
    end_location: ProviderPoint,
    #[serde(default)]
    path: Vec<ProviderPoint>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
struct ProviderPoint {
    lat: f64,
    lng: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TravelMode;

    #[test]
    fn test_new_defaults_to_direct_token() {
        let client = DirectionsClient::new("test-key".to_string());
        assert_eq!(client.base_url, DIRECTIONS_BASE_URL);
        assert!(matches!(client.auth_mode, AuthMode::DirectToken));
    }

    #[test]
    fn test_with_config_bearer_mode() {
        let client = DirectionsClient::with_config(
            "my-key".to_string(),
            "http://localhost:4000/v1/routes".to_string(),
            AuthMode::BearerHeader,
        );
        assert_eq!(client.base_url, "http://localhost:4000/v1/routes");
        assert!(matches!(client.auth_mode, AuthMode::BearerHeader));
    }

    #[test]
    fn test_status_mapping() {
        assert!(map_provider_status("OK").is_ok());
        assert!(matches!(
            map_provider_status("NOT_FOUND"),
            Err(AppError::RouteNotFound(_))
        ));
        assert!(matches!(
            map_provider_status("ZERO_RESULTS"),
            Err(AppError::RouteNotFound(_))
        ));
        assert!(matches!(
            map_provider_status("OVER_QUERY_LIMIT"),
            Err(AppError::DirectionsApi(_))
        ));
        assert!(matches!(
            map_provider_status("REQUEST_DENIED"),
            Err(AppError::DirectionsApi(_))
        ));
        assert!(matches!(
            map_provider_status("SOMETHING_NEW"),
            Err(AppError::DirectionsApi(_))
        ));
    }

    #[test]
    fn test_convert_route_derives_bounds_when_absent() {
        let route = ProviderRoute {
            summary: None,
            bounds: None,
            overview_path: vec![
                ProviderPoint { lat: 40.4168, lng: -3.7038 },
                ProviderPoint { lat: 39.4699, lng: -0.3763 },
            ],
            legs: vec![ProviderLeg {
                distance_meters: 360_000.0,
                duration_seconds: 12_600.0,
                start_location: ProviderPoint { lat: 40.4168, lng: -3.7038 },
                end_location: ProviderPoint { lat: 39.4699, lng: -0.3763 },
                steps: vec![],
            }],
        };

        let result = convert_route(route).unwrap();
        assert_eq!(result.bounds.northeast.lat, 40.4168);
        assert_eq!(result.bounds.southwest.lng, -3.7038);
        assert_eq!(result.summary, "");
    }

    #[test]
    fn test_convert_route_rejects_empty_path() {
        let route = ProviderRoute {
            summary: Some("A-3".to_string()),
            bounds: None,
            overview_path: vec![],
            legs: vec![],
        };
        assert!(convert_route(route).is_err());
    }

    #[test]
    fn test_invalid_request_rejected_before_network() {
        // An out-of-range origin must fail validation without any HTTP call.
        let request = RouteRequest {
            origin: RoutePoint {
                name: "bad".to_string(),
                lat: 95.0,
                lng: 0.0,
            },
            destination: RoutePoint {
                name: "Valencia".to_string(),
                lat: 39.4699,
                lng: -0.3763,
            },
            waypoints: vec![],
            mode: TravelMode::Driving,
        };

        let client = DirectionsClient::new("test-key".to_string());
        let result = tokio_test::block_on(client.compute_route(&request));
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }
}
