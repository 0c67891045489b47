//! Application state shared by all handlers.

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::db::DbPool;

#[derive(Clone)]
pub struct AppState {
    /// Card store connection
    pub db: DbPool,

    /// Source of "now" for grading and due selection
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(db: DbPool) -> Self {
        Self::with_clock(db, Arc::new(SystemClock))
    }

    pub fn with_clock(db: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }
}
