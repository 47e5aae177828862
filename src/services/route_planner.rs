//! Route planning orchestration: replay from snapshot when possible, fall
//! back to a fresh computation, and make sure a stale in-flight computation
//! can never overwrite a newer one.

use crate::error::{AppError, Result};
use crate::models::route::{RouteRequest, RouteResult};
use crate::models::RouteSnapshot;
use crate::services::directions::DirectionsClient;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

/// The one component allowed to create a `RouteResult` from the network.
#[async_trait]
pub trait RouteComputer: Send + Sync {
    async fn compute_route(&self, request: &RouteRequest) -> Result<RouteResult>;
}

#[async_trait]
impl RouteComputer for DirectionsClient {
    async fn compute_route(&self, request: &RouteRequest) -> Result<RouteResult> {
        DirectionsClient::compute_route(self, request).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteSource {
    /// Decoded from a stored snapshot; no network call was made.
    Replayed,
    /// Freshly computed by the directions provider.
    Computed,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedRoute {
    pub route: RouteResult,
    pub source: RouteSource,
}

/// Explicit session state for one route-planning flow. Replaces the
/// browser-global string-keyed flags of older clients: initialization and
/// teardown are defined points, not whatever happens to be in local storage.
#[derive(Debug)]
pub struct PlanningSession {
    pub id: Uuid,
    pub gps_active: bool,
    pub active_trip: Option<Uuid>,
    pub started_at: OffsetDateTime,
}

impl PlanningSession {
    pub fn new() -> Self {
        let session = PlanningSession {
            id: Uuid::new_v4(),
            gps_active: false,
            active_trip: None,
            started_at: OffsetDateTime::now_utc(),
        };
        tracing::debug!("Planning session {} started", session.id);
        session
    }

    pub fn set_gps_active(&mut self, active: bool) {
        self.gps_active = active;
    }

    pub fn attach_trip(&mut self, trip_id: Uuid) {
        self.active_trip = Some(trip_id);
    }

    /// Explicit teardown; any state the session carried dies with it.
    pub fn close(self) {
        tracing::debug!(
            "Planning session {} closed (trip: {:?})",
            self.id,
            self.active_trip
        );
    }
}

impl Default for PlanningSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot-first route planner with last-request-wins semantics.
#[derive(Clone)]
pub struct RoutePlanner {
    computer: Arc<dyn RouteComputer>,
    generation: Arc<AtomicU64>,
}

impl RoutePlanner {
    pub fn new(computer: Arc<dyn RouteComputer>) -> Self {
        RoutePlanner {
            computer,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Plan a route.
    ///
    /// One fallback rule: when a snapshot is supplied, attempt to decode it;
    /// on any missing or invalid field fall back to the directions provider.
    /// Replay never touches the network.
    ///
    /// Each call claims a new generation. If a newer call arrives while the
    /// provider request is in flight, the older call's result is discarded as
    /// [`AppError::Superseded`] so a slow stale response cannot overwrite a
    /// newer one.
    pub async fn plan(
        &self,
        request: &RouteRequest,
        snapshot: Option<&RouteSnapshot>,
    ) -> Result<PlannedRoute> {
        request.validate().map_err(AppError::InvalidRequest)?;

        let mut session = PlanningSession::new();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(snapshot) = snapshot {
            match snapshot.decode(&request.origin, &request.destination) {
                Ok(route) => {
                    tracing::debug!(
                        "Replayed route {} -> {} from snapshot",
                        request.origin.name,
                        request.destination.name
                    );
                    session.close();
                    return Ok(PlannedRoute {
                        route,
                        source: RouteSource::Replayed,
                    });
                }
                Err(AppError::InvalidSnapshot(reason)) => {
                    tracing::warn!(
                        "Snapshot for {} -> {} not replayable ({}), recomputing",
                        request.origin.name,
                        request.destination.name,
                        reason
                    );
                }
                Err(e) => {
                    session.close();
                    return Err(e);
                }
            }
        }

        session.set_gps_active(true);
        let result = self.computer.compute_route(request).await;
        session.close();

        let route = result?;

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(
                "Discarding stale route result for generation {} (current {})",
                generation,
                self.generation.load(Ordering::SeqCst)
            );
            return Err(AppError::Superseded);
        }

        Ok(PlannedRoute {
            route,
            source: RouteSource::Computed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::route::{RouteLeg, RoutePoint, TravelMode};
    use crate::models::{Coordinates, LatLngBounds};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn point(name: &str, lat: f64, lng: f64) -> RoutePoint {
        RoutePoint {
            name: name.to_string(),
            lat,
            lng,
        }
    }

    fn madrid_valencia_request() -> RouteRequest {
        RouteRequest {
            origin: point("Madrid", 40.4168, -3.7038),
            destination: point("Valencia", 39.4699, -0.3763),
            waypoints: vec![],
            mode: TravelMode::Driving,
        }
    }

    fn sample_route() -> RouteResult {
        let path = vec![
            Coordinates::new(40.4168, -3.7038).unwrap(),
            Coordinates::new(39.4699, -0.3763).unwrap(),
        ];
        RouteResult {
            legs: vec![RouteLeg {
                distance_meters: 360_000.0,
                duration_seconds: 12_600.0,
                start_location: path[0],
                end_location: path[1],
                steps: vec![],
            }],
            bounds: LatLngBounds::enclosing(&path).unwrap(),
            overview_path: path,
            summary: "A-3".to_string(),
        }
    }

    struct StubComputer {
        calls: AtomicUsize,
        delay: Duration,
    }

    #[async_trait]
    impl RouteComputer for StubComputer {
        async fn compute_route(&self, _request: &RouteRequest) -> Result<RouteResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(sample_route())
        }
    }

    fn planner_with_stub(delay: Duration) -> (RoutePlanner, Arc<StubComputer>) {
        let stub = Arc::new(StubComputer {
            calls: AtomicUsize::new(0),
            delay,
        });
        (RoutePlanner::new(stub.clone()), stub)
    }

    #[tokio::test]
    async fn valid_snapshot_replays_without_computing() {
        let (planner, stub) = planner_with_stub(Duration::ZERO);
        let snapshot = RouteSnapshot::encode(&sample_route());

        let planned = planner
            .plan(&madrid_valencia_request(), Some(&snapshot))
            .await
            .unwrap();

        assert_eq!(planned.source, RouteSource::Replayed);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
        assert_eq!(planned.route.overview_path.len(), 2);
    }

    #[tokio::test]
    async fn invalid_snapshot_falls_back_to_compute() {
        let (planner, stub) = planner_with_stub(Duration::ZERO);
        let mut snapshot = RouteSnapshot::encode(&sample_route());
        snapshot.overview_path.clear();

        let planned = planner
            .plan(&madrid_valencia_request(), Some(&snapshot))
            .await
            .unwrap();

        assert_eq!(planned.source, RouteSource::Computed);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn no_snapshot_computes() {
        let (planner, stub) = planner_with_stub(Duration::ZERO);
        let planned = planner.plan(&madrid_valencia_request(), None).await.unwrap();
        assert_eq!(planned.source, RouteSource::Computed);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn slow_stale_request_is_superseded() {
        let (planner, _stub) = planner_with_stub(Duration::from_millis(50));

        let slow_planner = planner.clone();
        let slow = tokio::spawn(async move {
            slow_planner.plan(&madrid_valencia_request(), None).await
        });

        // Let the slow request claim its generation, then claim a newer one
        // as a second concurrent plan() call would.
        tokio::time::sleep(Duration::from_millis(10)).await;
        planner.generation.fetch_add(1, Ordering::SeqCst);

        let result = slow.await.unwrap();
        assert!(matches!(result, Err(AppError::Superseded)));
    }

    #[tokio::test]
    async fn invalid_request_rejected_before_session_starts() {
        let (planner, stub) = planner_with_stub(Duration::ZERO);
        let mut request = madrid_valencia_request();
        request.destination.lng = 200.0;

        let result = planner.plan(&request, None).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn session_lifecycle() {
        let mut session = PlanningSession::new();
        assert!(!session.gps_active);
        session.set_gps_active(true);
        let trip = Uuid::new_v4();
        session.attach_trip(trip);
        assert_eq!(session.active_trip, Some(trip));
        session.close();
    }
}
