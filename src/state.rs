use std::sync::Arc;

use crate::analytics::{AnalyticsStore, InMemoryAnalyticsStore};
use crate::collection::CollectionRepository;
use crate::config::{AppConfig, StorageBackend};
use crate::storage::{DocumentStore, MemoryStore, StoreError, YandexDiskClient};

/// Shared handler dependencies
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repo: CollectionRepository,
    pub analytics: Arc<dyn AnalyticsStore>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>, analytics: Arc<dyn AnalyticsStore>) -> Self {
        let repo = CollectionRepository::new(store, config.storage.root.clone(), config.storage.max_write_attempts);
        Self {
            config: Arc::new(config),
            repo,
            analytics,
        }
    }

    /// Build the store selected by `config.storage.backend`
    pub fn from_config(config: AppConfig) -> Result<Self, StoreError> {
        let store: Arc<dyn DocumentStore> = match config.storage.backend {
            StorageBackend::Yandex => Arc::new(YandexDiskClient::new(
                &config.storage.api_url,
                config.storage.request_timeout_secs,
            )?),
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory document store; data is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };
        let analytics = Arc::new(InMemoryAnalyticsStore::new(config.analytics.max_events));

        Ok(Self::new(config, store, analytics))
    }
}
