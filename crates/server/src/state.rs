//! Application state shared across handlers.

use paulocell_core::config::AppConfig;
use paulocell_store::CollectionStore;
use paulocell_trash::TrashBin;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Collection store.
    pub store: Arc<dyn CollectionStore>,
    /// Trash bin over the same store.
    pub trash: TrashBin,
}

impl AppState {
    /// Create the application state. The trash bin shares the store.
    pub fn new(config: AppConfig, store: Arc<dyn CollectionStore>) -> Self {
        let trash = TrashBin::new(store.clone(), &config.trash);
        Self {
            config: Arc::new(config),
            store,
            trash,
        }
    }
}
