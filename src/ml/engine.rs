use crate::config::ModelsConfig;
use crate::ml::error::{InferenceError, ModelLoadError};
use crate::ml::models::{ModelMetadata, PriorityModel, SeverityModel};
use crate::ml::vector::FeatureVector;
use crate::models::{Priority, PriorityProbabilities};
use tracing::info;

/// Raw outputs of both models for one feature vector
#[derive(Debug, Clone, PartialEq)]
pub struct Scores {
    pub priority: Priority,
    /// Unclamped regression output
    pub severity: f64,
    pub probabilities: Option<PriorityProbabilities>,
}

/// Priority classifier and severity regressor sharing one feature schema.
///
/// Immutable once built; share it behind an `Arc`.
pub struct InferenceEngine {
    priority: PriorityModel,
    severity: SeverityModel,
}

impl InferenceEngine {
    pub fn new(priority: PriorityModel, severity: SeverityModel) -> Self {
        Self { priority, severity }
    }

    /// Load both artifacts named by the configuration
    pub fn load(config: &ModelsConfig) -> Result<Self, ModelLoadError> {
        let priority = PriorityModel::load(&config.priority_model_path)?;
        let meta = priority.metadata();
        info!(
            path = %config.priority_model_path,
            name = %meta.name,
            version = %meta.version,
            kind = %meta.kind,
            supports_probabilities = meta.supports_probabilities,
            sha256 = meta.sha256.as_deref().unwrap_or("-"),
            "Loaded priority model"
        );

        let severity = SeverityModel::load(&config.severity_model_path)?;
        let meta = severity.metadata();
        info!(
            path = %config.severity_model_path,
            name = %meta.name,
            version = %meta.version,
            kind = %meta.kind,
            sha256 = meta.sha256.as_deref().unwrap_or("-"),
            "Loaded severity model"
        );

        Ok(Self::new(priority, severity))
    }

    pub fn predict_label(&self, vector: &FeatureVector) -> Result<Priority, InferenceError> {
        let x = self.priority.preprocessor().transform(vector)?;
        self.priority.capability().predict_label(x.view())
    }

    pub fn predict_regression(&self, vector: &FeatureVector) -> Result<f64, InferenceError> {
        let x = self.severity.preprocessor().transform(vector)?;
        self.severity.regressor().predict(x.view())
    }

    pub fn predict_probabilities(
        &self,
        vector: &FeatureVector,
    ) -> Result<Option<PriorityProbabilities>, InferenceError> {
        if !self.supports_probabilities() {
            return Ok(None);
        }
        let x = self.priority.preprocessor().transform(vector)?;
        self.priority.capability().predict_probabilities(x.view())
    }

    pub fn supports_probabilities(&self) -> bool {
        self.priority.capability().supports_probabilities()
    }

    /// Run both models on the same vector, encoding it once per model
    pub fn score(&self, vector: &FeatureVector) -> Result<Scores, InferenceError> {
        let x = self.priority.preprocessor().transform(vector)?;
        let capability = self.priority.capability();
        let priority = capability.predict_label(x.view())?;
        let probabilities = capability.predict_probabilities(x.view())?;
        let severity = self.predict_regression(vector)?;

        Ok(Scores {
            priority,
            severity,
            probabilities,
        })
    }

    pub fn labels(&self) -> &[Priority] {
        self.priority.capability().classes()
    }

    pub fn metadata(&self) -> Vec<ModelMetadata> {
        vec![
            self.priority.metadata().clone(),
            self.severity.metadata().clone(),
        ]
    }
}
