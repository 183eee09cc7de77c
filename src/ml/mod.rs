/// Model-side inference for incident triage
///
/// This module provides:
/// - Feature vectorization in the fixed schema order
/// - Column preprocessing (one-hot, standard scaling) loaded with each artifact
/// - Linear priority classifiers with an optional probability capability
/// - A linear severity regressor
/// - The inference engine and the prediction pipeline built on it

pub mod classifier;
pub mod engine;
pub mod error;
pub mod models;
pub mod preprocessor;
pub mod regressor;
pub mod service;
pub mod vector;

pub use classifier::{Classifier, PriorityCapability, ProbabilisticClassifier};
pub use engine::{InferenceEngine, Scores};
pub use error::{InferenceError, ModelLoadError};
pub use models::{
    EstimatorSpec, ModelArtifact, ModelKind, ModelMetadata, ModelRole, PriorityModel,
    SeverityModel,
};
pub use preprocessor::{ColumnEncoding, ColumnPreprocessor, ColumnSpec, HandleUnknown};
pub use regressor::Regressor;
pub use service::PredictionService;
pub use vector::{vectorize, ContractViolation, FeatureValue, FeatureVector};
