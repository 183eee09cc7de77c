pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::ml::{InferenceEngine, PredictionService};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictions: PredictionService,
    pub metrics_enabled: bool,
}

impl AppState {
    pub fn new(engine: Arc<InferenceEngine>) -> Self {
        Self {
            predictions: PredictionService::new(engine),
            metrics_enabled: true,
        }
    }

    /// Toggle the `/metrics` endpoint
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }
}
