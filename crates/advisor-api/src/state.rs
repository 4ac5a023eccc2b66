//! Application state shared across route handlers.

use std::sync::Arc;
use std::time::Instant;

use advisor_chat::AdvisorOrchestrator;
use advisor_core::config::AdvisorConfig;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Validated configuration; read-only after startup.
    pub config: Arc<AdvisorConfig>,
    /// Classifier, session store and generator behind one facade.
    pub advisor: Arc<AdvisorOrchestrator>,
    /// Server start time for uptime reporting.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: AdvisorConfig, advisor: AdvisorOrchestrator) -> Self {
        Self {
            config: Arc::new(config),
            advisor: Arc::new(advisor),
            start_time: Instant::now(),
        }
    }
}
