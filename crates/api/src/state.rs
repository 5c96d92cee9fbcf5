//! Application state shared across handlers.

use auth::Keys;
use database::Database;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Token signing/validation keys.
    pub keys: Keys,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: Database, keys: Keys) -> Self {
        Self { db, keys }
    }
}
