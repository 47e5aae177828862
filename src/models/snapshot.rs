//! Storage-neutral route snapshots.
//!
//! Each external route computation is a metered, possibly-failing network
//! call. A saved trip therefore carries an encoded copy of its geometry so it
//! can be replayed forever without recomputation. The snapshot holds nothing
//! but plain `{lat, lng}` pairs and scalars, so it is safe to persist as
//! JSON and independent of any mapping SDK.

use crate::constants::SNAPSHOT_ENDPOINT_TOLERANCE_KM;
use crate::error::{AppError, Result};
use crate::models::route::{RouteLeg, RoutePoint, RouteResult, RouteStep};
use crate::models::{Coordinates, LatLngBounds};
use serde::{Deserialize, Serialize};

/// Current snapshot schema version. Bump on breaking layout changes; decode
/// rejects versions it does not understand, which makes the caller recompute.
pub const SNAPSHOT_VERSION: u16 = 1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SnapshotPoint {
    pub lat: f64,
    pub lng: f64,
}

impl SnapshotPoint {
    fn from_coordinates(c: &Coordinates) -> Self {
        SnapshotPoint { lat: c.lat, lng: c.lng }
    }

    fn to_coordinates(self) -> Result<Coordinates> {
        Coordinates::new(self.lat, self.lng).map_err(AppError::InvalidSnapshot)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotStep {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub start_location: SnapshotPoint,
    pub end_location: SnapshotPoint,
    pub path: Vec<SnapshotPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotLeg {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub start_location: SnapshotPoint,
    pub end_location: SnapshotPoint,
    pub steps: Vec<SnapshotStep>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SnapshotBounds {
    pub northeast: SnapshotPoint,
    pub southwest: SnapshotPoint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSnapshot {
    pub version: u16,
    pub summary: String,
    pub overview_path: Vec<SnapshotPoint>,
    pub bounds: SnapshotBounds,
    pub legs: Vec<SnapshotLeg>,
}

impl RouteSnapshot {
    /// Flatten a computed route into its persistable form.
    pub fn encode(route: &RouteResult) -> Self {
        RouteSnapshot {
            version: SNAPSHOT_VERSION,
            summary: route.summary.clone(),
            overview_path: route
                .overview_path
                .iter()
                .map(SnapshotPoint::from_coordinates)
                .collect(),
            bounds: SnapshotBounds {
                northeast: SnapshotPoint::from_coordinates(&route.bounds.northeast),
                southwest: SnapshotPoint::from_coordinates(&route.bounds.southwest),
            },
            legs: route.legs.iter().map(encode_leg).collect(),
        }
    }

    /// Rebuild a replayable route from this snapshot without any network call.
    ///
    /// `origin` and `destination` are the endpoints of the owning trip record;
    /// a snapshot whose geometry no longer matches them (endpoints moved more
    /// than [`SNAPSHOT_ENDPOINT_TOLERANCE_KM`]) is rejected. Every
    /// `InvalidSnapshot` error from here means "fall back to a fresh
    /// computation", never a user-facing hard failure.
    pub fn decode(&self, origin: &RoutePoint, destination: &RoutePoint) -> Result<RouteResult> {
        if self.version != SNAPSHOT_VERSION {
            return Err(AppError::InvalidSnapshot(format!(
                "unsupported snapshot version {}",
                self.version
            )));
        }

        if self.overview_path.is_empty() {
            return Err(AppError::InvalidSnapshot(
                "empty overview path".to_string(),
            ));
        }

        if self.legs.is_empty() {
            return Err(AppError::InvalidSnapshot("no legs".to_string()));
        }

        let overview_path = self
            .overview_path
            .iter()
            .map(|p| p.to_coordinates())
            .collect::<Result<Vec<_>>>()?;

        self.check_endpoint(origin, overview_path.first(), "origin")?;
        self.check_endpoint(destination, overview_path.last(), "destination")?;

        let legs = self
            .legs
            .iter()
            .map(decode_leg)
            .collect::<Result<Vec<_>>>()?;

        let bounds = LatLngBounds {
            northeast: self.bounds.northeast.to_coordinates()?,
            southwest: self.bounds.southwest.to_coordinates()?,
        };

        Ok(RouteResult {
            legs,
            overview_path,
            bounds,
            summary: self.summary.clone(),
        })
    }

    fn check_endpoint(
        &self,
        requested: &RoutePoint,
        actual: Option<&Coordinates>,
        label: &str,
    ) -> Result<()> {
        let requested = requested
            .coordinates()
            .map_err(AppError::InvalidSnapshot)?;
        let actual = actual
            .ok_or_else(|| AppError::InvalidSnapshot(format!("missing {}", label)))?;

        let drift_km = requested.distance_to(actual);
        if drift_km > SNAPSHOT_ENDPOINT_TOLERANCE_KM {
            return Err(AppError::InvalidSnapshot(format!(
                "{} drifted {:.2}km from snapshot geometry",
                label, drift_km
            )));
        }
        Ok(())
    }
}

fn encode_leg(leg: &RouteLeg) -> SnapshotLeg {
    SnapshotLeg {
        distance_meters: leg.distance_meters,
        duration_seconds: leg.duration_seconds,
        start_location: SnapshotPoint::from_coordinates(&leg.start_location),
        end_location: SnapshotPoint::from_coordinates(&leg.end_location),
        steps: leg
            .steps
            .iter()
            .map(|s| SnapshotStep {
                distance_meters: s.distance_meters,
                duration_seconds: s.duration_seconds,
                start_location: SnapshotPoint::from_coordinates(&s.start_location),
                end_location: SnapshotPoint::from_coordinates(&s.end_location),
                path: s.path.iter().map(SnapshotPoint::from_coordinates).collect(),
            })
            .collect(),
    }
}

fn decode_leg(leg: &SnapshotLeg) -> Result<RouteLeg> {
    if leg.distance_meters < 0.0 || leg.duration_seconds < 0.0 {
        return Err(AppError::InvalidSnapshot(
            "negative leg distance or duration".to_string(),
        ));
    }

    let steps = leg
        .steps
        .iter()
        .map(|s| {
            Ok(RouteStep {
                distance_meters: s.distance_meters,
                duration_seconds: s.duration_seconds,
                start_location: s.start_location.to_coordinates()?,
                end_location: s.end_location.to_coordinates()?,
                path: s
                    .path
                    .iter()
                    .map(|p| p.to_coordinates())
                    .collect::<Result<Vec<_>>>()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RouteLeg {
        distance_meters: leg.distance_meters,
        duration_seconds: leg.duration_seconds,
        start_location: leg.start_location.to_coordinates()?,
        end_location: leg.end_location.to_coordinates()?,
        steps,
    })
}
