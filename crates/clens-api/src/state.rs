//! Application state.

use std::sync::Arc;

use clens_faces::FaceClient;
use clens_store::AnalyticsStore;

use crate::config::ApiConfig;
use crate::services::DedupCache;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<AnalyticsStore>,
    pub faces: Arc<FaceClient>,
    pub dedup: Arc<DedupCache>,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store = AnalyticsStore::from_env()?;
        let faces = FaceClient::from_env()?;
        let dedup = DedupCache::new(config.dedup_expiry_seconds);

        Ok(Self {
            config,
            store: Arc::new(store),
            faces: Arc::new(faces),
            dedup: Arc::new(dedup),
        })
    }
}
