//! Application state for the API server

use crate::config::Config;
use crate::export::RepoExporter;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned per request (cheap Arc clone).
#[derive(Clone)]
pub struct AppState {
    /// Export pipeline shared by all requests
    pub exporter: Arc<RepoExporter>,

    /// Configuration (read-only); `/health` reports the converter mode from it
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(exporter: Arc<RepoExporter>, config: Arc<Config>) -> Self {
        Self { exporter, config }
    }
}
