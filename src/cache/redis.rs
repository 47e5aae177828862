use crate::cache::{CacheStats, DatasetStore};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// Redis-backed store. All methods are `&self` — `ConnectionManager` is
/// `Arc`-based internally, so `.clone()` is a cheap atomic increment.
pub struct RedisDatasetStore {
    connection: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisDatasetStore {
    pub async fn new(redis_url: &str, ttl_seconds: u64) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| AppError::Cache(format!("Failed to create Redis client: {}", e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Cache(format!("Failed to connect to Redis: {}", e)))?;

        tracing::info!("Redis cache connection established");

        Ok(RedisDatasetStore {
            connection,
            ttl_seconds,
        })
    }
}

#[async_trait]
impl DatasetStore for RedisDatasetStore {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.connection.clone();
        let result: redis::RedisResult<Option<String>> = conn.get(key).await;

        match result {
            Ok(Some(value)) => {
                tracing::debug!("Redis cache hit: {}", key);
                Some(value)
            }
            Ok(None) => {
                tracing::debug!("Redis cache miss: {}", key);
                None
            }
            Err(e) => {
                tracing::warn!("Redis error getting {}: {}", key, e);
                None
            }
        }
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        let mut conn = self.connection.clone();
        let result: redis::RedisResult<()> = conn.set_ex(key, value, self.ttl_seconds).await;

        result.map_err(|e| AppError::Cache(format!("Failed to write {}: {}", key, e)))
    }

    async fn get_stats(&self) -> CacheStats {
        let mut conn = self.connection.clone();
        let info: redis::RedisResult<String> =
            redis::cmd("INFO").arg("stats").query_async(&mut conn).await;

        match info {
            Ok(info_str) => {
                let hits = parse_info_value(&info_str, "keyspace_hits");
                let misses = parse_info_value(&info_str, "keyspace_misses");
                let hit_rate = if hits + misses > 0 {
                    (hits as f64 / (hits + misses) as f64) * 100.0
                } else {
                    0.0
                };

                CacheStats {
                    hits,
                    misses,
                    hit_rate,
                    connected: true,
                }
            }
            Err(_) => CacheStats {
                hits: 0,
                misses: 0,
                hit_rate: 0.0,
                connected: false,
            },
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.connection.clone();
        let result: redis::RedisResult<String> =
            redis::cmd("PING").query_async(&mut conn).await;
        result.is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

fn parse_info_value(info: &str, key: &str) -> u64 {
    info.lines()
        .find(|line| line.starts_with(key))
        .and_then(|line| line.split(':').nth(1))
        .and_then(|val| val.trim().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_info_value() {
        let info = "keyspace_hits:42\r\nkeyspace_misses:7\r\n";
        assert_eq!(parse_info_value(info, "keyspace_hits"), 42);
        assert_eq!(parse_info_value(info, "keyspace_misses"), 7);
        assert_eq!(parse_info_value(info, "absent"), 0);
    }
}
