//! Application state for the HTTP server.

use crate::db::factory::SharedRepository;

/// Shared application state passed to all handlers.
///
/// Each request borrows the repository for the duration of one service call;
/// nothing else is shared between requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: SharedRepository,
}

impl AppState {
    /// Create a new application state with the given repository.
    pub fn new(repository: SharedRepository) -> Self {
        Self { repository }
    }
}
