use std::time::Duration;

use crate::pipeline::process::DEFAULT_MIN_PACE;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub max_file_size: usize,
    pub cache_ttl: Duration,
    /// Fastest believable pace in minutes per kilometre.
    pub min_pace: f64,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let max_file_size_mb = std::env::var("MAX_FILE_SIZE_MB")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(25);

        let cache_ttl_seconds = std::env::var("CACHE_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600);

        let min_pace = std::env::var("MIN_PACE_MIN_PER_KM")
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|pace| pace.is_finite() && *pace >= 0.0)
            .unwrap_or(DEFAULT_MIN_PACE);

        Self {
            port,
            max_file_size: max_file_size_mb * 1024 * 1024,
            cache_ttl: Duration::from_secs(cache_ttl_seconds),
            min_pace,
        }
    }
}
