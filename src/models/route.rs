use crate::constants::MAX_WAYPOINTS;
use crate::models::{Coordinates, LatLngBounds};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
}

impl TravelMode {
    /// Profile string sent to the directions provider.
    pub fn provider_profile(&self) -> &str {
        match self {
            TravelMode::Driving => "driving",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TravelMode::Driving => write!(f, "driving"),
        }
    }
}

impl FromStr for TravelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "driving" | "drive" | "car" => Ok(TravelMode::Driving),
            _ => Err(format!("Invalid travel mode: '{}'", s)),
        }
    }
}

/// A named stop along a trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutePoint {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl RoutePoint {
    pub fn coordinates(&self) -> Result<Coordinates, String> {
        Coordinates::new(self.lat, self.lng)
    }
}

/// Request for a fresh route computation.
///
/// `waypoints` is the caller's visiting order and is never reordered:
/// preserving user intent takes priority over path optimality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    pub origin: RoutePoint,
    pub destination: RoutePoint,
    #[serde(default)]
    pub waypoints: Vec<RoutePoint>,
    #[serde(default)]
    pub mode: TravelMode,
}

impl RouteRequest {
    /// Reject malformed requests before any network call is made.
    pub fn validate(&self) -> Result<(), String> {
        self.origin
            .coordinates()
            .map_err(|e| format!("origin: {}", e))?;
        self.destination
            .coordinates()
            .map_err(|e| format!("destination: {}", e))?;

        if self.waypoints.len() > MAX_WAYPOINTS {
            return Err(format!(
                "At most {} waypoints allowed, got {}",
                MAX_WAYPOINTS,
                self.waypoints.len()
            ));
        }

        for (i, wp) in self.waypoints.iter().enumerate() {
            wp.coordinates()
                .map_err(|e| format!("waypoint {}: {}", i, e))?;
        }

        Ok(())
    }
}

/// One instruction span of a leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteStep {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub start_location: Coordinates,
    pub end_location: Coordinates,
    pub path: Vec<Coordinates>,
}

/// The stretch between two consecutive stops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteLeg {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub start_location: Coordinates,
    pub end_location: Coordinates,
    pub steps: Vec<RouteStep>,
}

/// A computed route. Created only by the directions client or by replaying a
/// snapshot; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResult {
    pub legs: Vec<RouteLeg>,
    /// Simplified polyline covering the whole route. Non-empty for any
    /// successfully computed route.
    pub overview_path: Vec<Coordinates>,
    pub bounds: LatLngBounds,
    pub summary: String,
}

impl RouteResult {
    /// Total route distance: the sum of leg distances.
    pub fn distance_meters(&self) -> f64 {
        self.legs.iter().map(|l| l.distance_meters).sum()
    }

    /// Total route duration: the sum of leg durations.
    pub fn duration_seconds(&self) -> f64 {
        self.legs.iter().map(|l| l.duration_seconds).sum()
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_meters() / 1000.0
    }

    pub fn duration_minutes(&self) -> u32 {
        (self.duration_seconds() / 60.0).round() as u32
    }
}
