//! Application state for the profile API.

use std::sync::Arc;

use storage::ProfileReader;

/// Shared application state.
pub struct AppState {
    /// Read access to the profile catalog.
    pub reader: Arc<dyn ProfileReader>,
}

impl AppState {
    pub fn new(reader: Arc<dyn ProfileReader>) -> Self {
        Self { reader }
    }
}
