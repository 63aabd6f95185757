//! Application state for the API server.

use std::sync::Arc;

use super::page::PageRenderer;
use crate::db::Database;

/// Shared application state.
///
/// Generic over `D: Database` and `P: PageRenderer`, so tests can hand in
/// an in-memory database or a mock renderer. Dependencies are injected via
/// the constructor, never created internally.
pub struct AppState<D: Database, P: PageRenderer + Send + Sync> {
    db: Arc<D>,
    pages: Arc<P>,
}

// Manual Clone impl - only the Arcs are cloned, D and P need not be Clone
impl<D: Database, P: PageRenderer + Send + Sync> Clone for AppState<D, P> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            pages: Arc::clone(&self.pages),
        }
    }
}

impl<D: Database, P: PageRenderer + Send + Sync> AppState<D, P> {
    /// Create a new AppState with the given database and page renderer.
    pub fn new(db: D, pages: P) -> Self {
        Self {
            db: Arc::new(db),
            pages: Arc::new(pages),
        }
    }

    /// Get a reference to the database.
    pub fn db(&self) -> &D {
        &self.db
    }

    /// Get a reference to the page renderer.
    pub fn pages(&self) -> &P {
        &self.pages
    }
}
