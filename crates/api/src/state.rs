use std::sync::Arc;

use managix_core::engine::ProjectEngine;
use managix_core::store::ProjectStore;

use crate::config::ServerConfig;

/// The engine as the handlers see it: backed by whichever store the binary
/// selected at startup.
pub type Engine = ProjectEngine<dyn ProjectStore>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind an `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub engine: Engine,
    pub config: Arc<ServerConfig>,
    /// Present when running against Postgres. Used by the health check.
    pub pool: Option<managix_db::DbPool>,
}

impl AppState {
    pub fn new(store: Arc<dyn ProjectStore>, config: ServerConfig) -> Self {
        Self {
            engine: ProjectEngine::new(store),
            config: Arc::new(config),
            pool: None,
        }
    }

    pub fn with_pool(mut self, pool: managix_db::DbPool) -> Self {
        self.pool = Some(pool);
        self
    }
}
