use crate::config::Config;
use crate::types::activity::ProcessedActivity;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    cache: Arc<DashMap<String, CachedActivity>>,
}

struct CachedActivity {
    activity: Arc<ProcessedActivity>,
    inserted_at: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            cache: Arc::new(DashMap::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn insert(&self, file_id: String, activity: ProcessedActivity) {
        self.cache.insert(
            file_id,
            CachedActivity {
                activity: Arc::new(activity),
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn get(&self, file_id: &str) -> Option<Arc<ProcessedActivity>> {
        self.cache.get(file_id).map(|entry| Arc::clone(&entry.activity))
    }

    pub fn evict_expired(&self, ttl: Duration) {
        let now = Instant::now();
        self.cache.retain(|_, cached| {
            now.duration_since(cached.inserted_at) < ttl
        });
        tracing::info!("Cache eviction complete. Current size: {}", self.cache.len());
    }
}
