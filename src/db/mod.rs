pub mod trips;

pub use trips::{InMemoryTripRepository, PgTripRepository, TripRecord, TripRepository};

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}
