use crate::error::{AppError, Result};
use crate::models::route::RoutePoint;
use crate::models::RouteSnapshot;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use time::OffsetDateTime;
use uuid::Uuid;

/// A saved trip: endpoints, waypoints and the encoded route geometry.
/// The geometry snapshot lives as long as the record and lets the route be
/// replayed without another provider call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripRecord {
    pub id: Uuid,
    pub owner: String,
    pub name: String,
    pub description: Option<String>,
    pub origin: RoutePoint,
    pub destination: RoutePoint,
    pub waypoints: Vec<RoutePoint>,
    pub distance_km: f64,
    pub duration_minutes: i32,
    pub geometry: RouteSnapshot,
    pub created_at: OffsetDateTime,
}

#[async_trait]
pub trait TripRepository: Send + Sync {
    async fn insert(&self, trip: &TripRecord) -> Result<()>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TripRecord>>;
    async fn list_for_owner(&self, owner: &str) -> Result<Vec<TripRecord>>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

pub struct PgTripRepository {
    pool: PgPool,
}

impl PgTripRepository {
    pub fn new(pool: PgPool) -> Self {
        PgTripRepository { pool }
    }
}

#[async_trait]
impl TripRepository for PgTripRepository {
    async fn insert(&self, trip: &TripRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO trips
                (id, owner, name, description, origin, destination, waypoints,
                 distance_km, duration_minutes, geometry, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(trip.id)
        .bind(&trip.owner)
        .bind(&trip.name)
        .bind(&trip.description)
        .bind(Json(&trip.origin))
        .bind(Json(&trip.destination))
        .bind(Json(&trip.waypoints))
        .bind(trip.distance_km)
        .bind(trip.duration_minutes)
        .bind(Json(&trip.geometry))
        .bind(trip.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Inserted trip {} ({})", trip.id, trip.name);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TripRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, owner, name, description, origin, destination, waypoints,
                   distance_km, duration_minutes, geometry, created_at
            FROM trips WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_trip).transpose()
    }

    async fn list_for_owner(&self, owner: &str) -> Result<Vec<TripRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner, name, description, origin, destination, waypoints,
                   distance_km, duration_minutes, geometry, created_at
            FROM trips WHERE owner = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_trip).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM trips WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_trip(row: sqlx::postgres::PgRow) -> Result<TripRecord> {
    let Json(origin) = row.try_get("origin")?;
    let Json(destination) = row.try_get("destination")?;
    let Json(waypoints) = row.try_get("waypoints")?;
    let Json(geometry) = row.try_get("geometry")?;

    Ok(TripRecord {
        id: row.try_get("id")?,
        owner: row.try_get("owner")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        origin,
        destination,
        waypoints,
        distance_km: row.try_get("distance_km")?,
        duration_minutes: row.try_get("duration_minutes")?,
        geometry,
        created_at: row.try_get("created_at")?,
    })
}

/// In-memory repository for tests and local development without Postgres.
#[derive(Default)]
pub struct InMemoryTripRepository {
    trips: tokio::sync::RwLock<Vec<TripRecord>>,
}

impl InMemoryTripRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TripRepository for InMemoryTripRepository {
    async fn insert(&self, trip: &TripRecord) -> Result<()> {
        let mut trips = self.trips.write().await;
        if trips.iter().any(|t| t.id == trip.id) {
            return Err(AppError::Internal(format!("duplicate trip id {}", trip.id)));
        }
        trips.push(trip.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TripRecord>> {
        Ok(self.trips.read().await.iter().find(|t| t.id == id).cloned())
    }

    async fn list_for_owner(&self, owner: &str) -> Result<Vec<TripRecord>> {
        Ok(self
            .trips
            .read()
            .await
            .iter()
            .filter(|t| t.owner == owner)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut trips = self.trips.write().await;
        let before = trips.len();
        trips.retain(|t| t.id != id);
        Ok(trips.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::route::{RouteLeg, RouteResult};
    use crate::models::{Coordinates, LatLngBounds};

    fn sample_trip(owner: &str) -> TripRecord {
        let path = vec![
            Coordinates::new(40.4168, -3.7038).unwrap(),
            Coordinates::new(39.4699, -0.3763).unwrap(),
        ];
        let route = RouteResult {
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
        };

        TripRecord {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            name: "Madrid - Valencia".to_string(),
            description: None,
            origin: RoutePoint {
                name: "Madrid".to_string(),
                lat: 40.4168,
                lng: -3.7038,
            },
            destination: RoutePoint {
                name: "Valencia".to_string(),
                lat: 39.4699,
                lng: -0.3763,
            },
            waypoints: vec![],
            distance_km: route.distance_km(),
            duration_minutes: route.duration_minutes() as i32,
            geometry: RouteSnapshot::encode(&route),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn in_memory_crud_round_trip() {
        let repo = InMemoryTripRepository::new();
        let trip = sample_trip("ana");

        repo.insert(&trip).await.unwrap();
        let fetched = repo.find_by_id(trip.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Madrid - Valencia");
        assert_eq!(fetched.geometry.overview_path.len(), 2);

        assert_eq!(repo.list_for_owner("ana").await.unwrap().len(), 1);
        assert!(repo.list_for_owner("bob").await.unwrap().is_empty());

        assert!(repo.delete(trip.id).await.unwrap());
        assert!(!repo.delete(trip.id).await.unwrap());
        assert!(repo.find_by_id(trip.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_insert_rejected() {
        let repo = InMemoryTripRepository::new();
        let trip = sample_trip("ana");
        repo.insert(&trip).await.unwrap();
        assert!(repo.insert(&trip).await.is_err());
    }
}
