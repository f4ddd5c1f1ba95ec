use std::sync::Arc;

use chrono::Duration;
use tokio::task;

use farm_config::FarmConfig;
use farm_storage::Storage;
use farm_storage::records::RecordContext;

use crate::error::ApiResult;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Storage>,
    pub config: Arc<FarmConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Storage>, config: FarmConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn store(&self) -> &dyn Storage {
        self.store.as_ref()
    }

    /// Runs `f` on the blocking thread pool. SQLite calls and password
    /// hashing go through here, never straight from an async handler.
    pub async fn blocking<T, F>(&self, f: F) -> ApiResult<T>
    where
        F: FnOnce(&AppState) -> ApiResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let state = self.clone();
        task::spawn_blocking(move || f(&state)).await?
    }

    /// Settings for a record write made by `actor`.
    pub fn record_ctx<'a>(&'a self, actor: &'a str) -> RecordContext<'a> {
        RecordContext::new(actor, &self.config.numbering)
            .with_default_reorder_level(self.config.inventory.default_reorder_level)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::hours(i64::from(self.config.auth.session_ttl_hours))
    }
}
