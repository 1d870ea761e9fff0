//! Shared application state for the Axum server.

use std::sync::Arc;

use nf_tabular::mock::MockDatasetSource;

use crate::agent::AgentContext;
use crate::inference::{DisabledGenerator, TextGenerator};
use crate::router::QueryRouter;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Dataset lifecycle and query router.
    pub agent: AgentContext,
    /// Allowed CORS origins; empty allows any.
    pub cors_origins: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(agent: AgentContext) -> Self {
        Self {
            agent,
            cors_origins: Arc::new(Vec::new()),
        }
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Arc::new(origins);
        self
    }

    /// Ready state over the sample dataset, with the given fallback (for tests).
    pub fn with_sample_fallback(fallback: Arc<dyn TextGenerator>) -> Self {
        let agent = AgentContext::preloaded(
            Arc::new(MockDatasetSource::sample()),
            QueryRouter::new(fallback),
            nf_tabular::mock::sample_store(),
        );
        Self::new(agent)
    }

    /// Ready state over the sample dataset, fallback disabled.
    pub fn with_sample_data() -> Self {
        Self::with_sample_fallback(Arc::new(DisabledGenerator))
    }
}
