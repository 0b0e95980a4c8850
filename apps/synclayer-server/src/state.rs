//! Application state management

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::Config;
use crate::sync::SyncStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    store: SyncStore,
}

impl AppState {
    /// Create a new application state with an empty store
    pub fn new(config: Config) -> Self {
        let store = SyncStore::with_tombstone_retention(config.sync.tombstone_retention);

        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the sync store
    pub fn store(&self) -> &SyncStore {
        &self.inner.store
    }

    /// Start background maintenance for the store.
    ///
    /// Returns the task handle so the caller can stop it on shutdown.
    pub fn start_background_tasks(&self) -> Option<JoinHandle<()>> {
        let handle = self
            .store()
            .clone()
            .start_cleanup_task(self.config().sync.cleanup_interval);

        if handle.is_some() {
            tracing::info!(
                every_secs = self.config().sync.cleanup_interval.as_secs(),
                "Tombstone cleanup task started"
            );
        }

        handle
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
