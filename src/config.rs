use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    /// Empty means no routing provider; distances come from the haversine fallback.
    pub routing_api_key: String,
    pub routing_url: String,
    pub routing_timeout_ms: u64,
    pub surge_radius_km: f64,
    pub available_default_limit: i64,
    pub available_max_limit: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "gofer.db".to_string()),
            routing_api_key: env::var("ROUTING_API_KEY").unwrap_or_default(),
            routing_url: env::var("ROUTING_URL").unwrap_or_else(|_| {
                "https://maps.googleapis.com/maps/api/distancematrix/json".to_string()
            }),
            routing_timeout_ms: env::var("ROUTING_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            surge_radius_km: env::var("SURGE_RADIUS_KM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5.0),
            available_default_limit: env::var("AVAILABLE_DEFAULT_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            available_max_limit: env::var("AVAILABLE_MAX_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(50),
        }
    }

    pub fn has_routing_provider(&self) -> bool {
        !self.routing_api_key.is_empty()
    }
}
