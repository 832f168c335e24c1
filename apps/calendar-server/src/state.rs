//! Application state.

use std::sync::Arc;

use event_store::{EventStore, MemoryEventStore, SqliteEventStore, StoreResult};

use crate::config::ServerConfig;
use crate::services::{EventService, NormalizeRules};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Event handling backed by the configured store.
    pub events: EventService,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Creates new application state.
    pub fn new(config: ServerConfig, store: Arc<dyn EventStore>) -> Self {
        let rules = NormalizeRules::from(&config);
        Self {
            events: EventService::new(store, rules),
            config: Arc::new(config),
        }
    }
}

/// Opens the store named by `database_url`, or an in-memory one when unset.
pub async fn open_store(config: &ServerConfig) -> StoreResult<Arc<dyn EventStore>> {
    match &config.database_url {
        Some(url) => {
            tracing::info!(database_url = %url, "Using SQLite event store");
            Ok(Arc::new(SqliteEventStore::connect(url).await?))
        }
        None => {
            tracing::info!("Using in-memory event store");
            Ok(Arc::new(MemoryEventStore::new()))
        }
    }
}
