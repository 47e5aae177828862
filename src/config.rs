use crate::constants::*;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub redis_url: Option<String>,
    pub directions_api_key: String,
    /// Override for the directions provider base URL (proxy deployments).
    pub directions_base_url: Option<String>,
    pub geocoding_base_url: Option<String>,
    pub poi_source_base_url: String,
    pub dataset_cache_ttl: u64,
    pub revalidate_interval: u64,
    pub poi_page_size: usize,
    pub default_search_radius_m: f64,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let default_search_radius_m: f64 = env::var("DEFAULT_SEARCH_RADIUS_M")
            .unwrap_or_else(|_| DEFAULT_SEARCH_RADIUS_METERS.to_string())
            .parse()
            .map_err(|_| "Invalid DEFAULT_SEARCH_RADIUS_M")?;

        if default_search_radius_m < 0.0 || default_search_radius_m > MAX_SEARCH_RADIUS_METERS {
            return Err(format!(
                "DEFAULT_SEARCH_RADIUS_M must be between 0 and {} meters",
                MAX_SEARCH_RADIUS_METERS
            ));
        }

        let poi_page_size: usize = env::var("POI_PAGE_SIZE")
            .unwrap_or_else(|_| DEFAULT_POI_PAGE_SIZE.to_string())
            .parse()
            .map_err(|_| "Invalid POI_PAGE_SIZE")?;

        if poi_page_size == 0 {
            return Err("POI_PAGE_SIZE must be at least 1".to_string());
        }

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            database_url: env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            redis_url: env::var("REDIS_URL").ok(),
            directions_api_key: env::var("DIRECTIONS_API_KEY")
                .map_err(|_| "DIRECTIONS_API_KEY must be set")?,
            directions_base_url: env::var("DIRECTIONS_BASE_URL").ok(),
            geocoding_base_url: env::var("GEOCODING_BASE_URL").ok(),
            poi_source_base_url: env::var("POI_SOURCE_BASE_URL")
                .map_err(|_| "POI_SOURCE_BASE_URL must be set")?,
            dataset_cache_ttl: env::var("DATASET_CACHE_TTL")
                .unwrap_or_else(|_| DEFAULT_DATASET_CACHE_TTL_SECONDS.to_string())
                .parse()
                .map_err(|_| "Invalid DATASET_CACHE_TTL")?,
            revalidate_interval: env::var("DATASET_REVALIDATE_INTERVAL")
                .unwrap_or_else(|_| DEFAULT_REVALIDATE_INTERVAL_SECONDS.to_string())
                .parse()
                .map_err(|_| "Invalid DATASET_REVALIDATE_INTERVAL")?,
            poi_page_size,
            default_search_radius_m,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
