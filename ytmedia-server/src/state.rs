//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use ytmedia_core::DownloadOrchestrator;
use ytmedia_core::source::VideoSource;

use crate::config::Config;

/// State shared across all HTTP handlers. Built once at startup; nothing in
/// here is mutated per request.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// The process-wide video source client.
    pub source: Arc<dyn VideoSource>,
    /// Download workflow bound to the same client.
    pub downloads: Arc<DownloadOrchestrator>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("downloads", &self.downloads)
            .finish_non_exhaustive()
    }
}
