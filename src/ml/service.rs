use crate::error::{AppError, Result};
use crate::metrics::{
    INFERENCE_DURATION_SECONDS, MODELS_INFO, PREDICTIONS_TOTAL, PREDICTION_FAILURES_TOTAL,
    SEVERITY_SCORE,
};
use crate::ml::engine::InferenceEngine;
use crate::ml::models::ModelMetadata;
use crate::ml::vector::vectorize;
use crate::models::PredictionResult;
use crate::triage;
use crate::validation::validate;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Runs the prediction pipeline: validate, vectorize, score, compose.
#[derive(Clone)]
pub struct PredictionService {
    engine: Arc<InferenceEngine>,
}

impl PredictionService {
    pub fn new(engine: Arc<InferenceEngine>) -> Self {
        for meta in engine.metadata() {
            MODELS_INFO
                .with_label_values(&[meta.role.as_str(), meta.name.as_str(), meta.version.as_str()])
                .set(1.0);
        }
        Self { engine }
    }

    /// Score one raw request body. The first failing stage short-circuits.
    pub fn predict(&self, raw: &Value) -> Result<PredictionResult> {
        let timer = INFERENCE_DURATION_SECONDS.start_timer();
        let outcome = self.run(raw);
        timer.observe_duration();

        match &outcome {
            Ok(result) => {
                PREDICTIONS_TOTAL
                    .with_label_values(&[
                        result.priority_prediction.as_ref(),
                        result.recommended_action.code(),
                    ])
                    .inc();
                SEVERITY_SCORE.observe(result.severity_prediction);
                debug!(
                    priority = %result.priority_prediction,
                    severity = result.severity_prediction,
                    action = result.recommended_action.code(),
                    "Prediction complete"
                );
            }
            Err(e) => {
                PREDICTION_FAILURES_TOTAL
                    .with_label_values(&[e.kind()])
                    .inc();
            }
        }

        outcome
    }

    fn run(&self, raw: &Value) -> Result<PredictionResult> {
        let record = validate(raw)?;
        let vector = vectorize(&record)?;
        let scores = self.engine.score(&vector)?;

        Ok(triage::compose(
            scores.priority,
            scores.severity,
            scores.probabilities,
        ))
    }

    /// Record a request that failed before reaching the pipeline
    pub fn record_rejection(&self, err: &AppError) {
        PREDICTION_FAILURES_TOTAL
            .with_label_values(&[err.kind()])
            .inc();
    }

    pub fn model_metadata(&self) -> Vec<ModelMetadata> {
        self.engine.metadata()
    }

    pub fn supports_probabilities(&self) -> bool {
        self.engine.supports_probabilities()
    }
}
