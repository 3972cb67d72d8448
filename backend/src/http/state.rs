//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::services::RequestIdStrategy;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    /// How emergency match request ids are generated
    pub request_ids: RequestIdStrategy,
}

impl AppState {
    /// Create a new application state with the given repository and
    /// timestamp-based request ids.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self {
            repository,
            request_ids: RequestIdStrategy::default(),
        }
    }

    pub fn with_request_ids(mut self, strategy: RequestIdStrategy) -> Self {
        self.request_ids = strategy;
        self
    }
}
