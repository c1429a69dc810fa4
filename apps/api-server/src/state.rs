//! Shared handler state.

use pharmapos_db::Database;

/// State handed to every handler. Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}
