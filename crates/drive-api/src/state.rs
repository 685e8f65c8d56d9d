//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use drive_core::config::AppConfig;
use drive_database::Stores;
use drive_service::DriveFacade;

/// Application state passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Backing stores, for health checks
    pub stores: Stores,
    /// Drive operations
    pub drive: DriveFacade,
}

impl AppState {
    /// Build the state and wire the façade to `stores`.
    pub fn new(config: AppConfig, stores: Stores) -> Self {
        let drive = DriveFacade::from_stores(&stores, &config.quota);
        Self {
            config: Arc::new(config),
            stores,
            drive,
        }
    }
}
