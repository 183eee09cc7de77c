use crate::ml::classifier::{
    LinearDecision, LinearSvcClassifier, LogisticRegressionClassifier, PriorityCapability,
};
use crate::ml::error::ModelLoadError;
use crate::ml::preprocessor::ColumnPreprocessor;
use crate::ml::regressor::{LinearRegressor, Regressor};
use crate::models::Priority;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Estimator family stored in an artifact
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    LogisticRegression,
    LinearSvc,
    LinearRegression,
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKind::LogisticRegression => write!(f, "Logistic Regression"),
            ModelKind::LinearSvc => write!(f, "Linear Support Vector Classifier"),
            ModelKind::LinearRegression => write!(f, "Linear Regression"),
        }
    }
}

/// Which slot of the engine a model fills
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelRole {
    Priority,
    Severity,
}

impl ModelRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelRole::Priority => "priority",
            ModelRole::Severity => "severity",
        }
    }
}

/// Fitted estimator parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimatorSpec {
    LogisticRegression {
        classes: Vec<String>,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    },
    LinearSvc {
        classes: Vec<String>,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    },
    LinearRegression {
        coefficients: Vec<f64>,
        intercept: f64,
    },
}

impl EstimatorSpec {
    pub fn kind(&self) -> ModelKind {
        match self {
            EstimatorSpec::LogisticRegression { .. } => ModelKind::LogisticRegression,
            EstimatorSpec::LinearSvc { .. } => ModelKind::LinearSvc,
            EstimatorSpec::LinearRegression { .. } => ModelKind::LinearRegression,
        }
    }
}

/// A persisted preprocessing + estimator pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelArtifact {
    pub name: String,
    pub version: String,
    pub preprocessor: ColumnPreprocessor,
    pub estimator: EstimatorSpec,
}

/// Read an artifact file, returning it with the sha256 digest of its bytes
fn read_artifact(path: &Path) -> Result<(ModelArtifact, String), ModelLoadError> {
    let bytes = std::fs::read(path).map_err(|source| ModelLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = format!("{:x}", hasher.finalize());

    let artifact = serde_json::from_slice(&bytes).map_err(|source| ModelLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok((artifact, digest))
}

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelMetadata {
    /// Model name
    pub name: String,

    /// Model version
    pub version: String,

    /// Engine slot
    pub role: ModelRole,

    /// Estimator family
    pub kind: ModelKind,

    /// Class labels, classifiers only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<Priority>>,

    /// Whether class probabilities can be exported
    pub supports_probabilities: bool,

    /// Width of the encoded input
    pub n_features: usize,

    /// Hex sha256 of the artifact file, when loaded from disk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,

    /// Load timestamp
    pub loaded_at: DateTime<Utc>,
}

/// Loaded priority classifier with its preprocessing
pub struct PriorityModel {
    preprocessor: ColumnPreprocessor,
    capability: PriorityCapability,
    metadata: ModelMetadata,
}

impl PriorityModel {
    /// Load and check a priority artifact from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelLoadError> {
        let (artifact, digest) = read_artifact(path.as_ref())?;
        Self::from_artifact(artifact, Some(digest))
    }

    pub fn from_artifact(
        artifact: ModelArtifact,
        sha256: Option<String>,
    ) -> Result<Self, ModelLoadError> {
        let ModelArtifact {
            name,
            version,
            preprocessor,
            estimator,
        } = artifact;

        preprocessor.check(&name)?;
        let width = preprocessor.output_width();
        let kind = estimator.kind();

        let capability = match estimator {
            EstimatorSpec::LogisticRegression {
                classes,
                coefficients,
                intercepts,
            } => {
                let decision = LinearDecision::new(&name, coefficients, intercepts, width)?;
                PriorityCapability::WithProbabilities(Box::new(
                    LogisticRegressionClassifier::new(&name, decision, &classes)?,
                ))
            }
            EstimatorSpec::LinearSvc {
                classes,
                coefficients,
                intercepts,
            } => {
                let decision = LinearDecision::new(&name, coefficients, intercepts, width)?;
                PriorityCapability::LabelOnly(Box::new(LinearSvcClassifier::new(
                    &name, decision, &classes,
                )?))
            }
            EstimatorSpec::LinearRegression { .. } => {
                return Err(ModelLoadError::invalid(
                    &name,
                    "a regressor cannot serve as the priority model",
                ))
            }
        };

        let metadata = ModelMetadata {
            name,
            version,
            role: ModelRole::Priority,
            kind,
            classes: Some(capability.classes().to_vec()),
            supports_probabilities: capability.supports_probabilities(),
            n_features: width,
            sha256,
            loaded_at: Utc::now(),
        };

        Ok(Self {
            preprocessor,
            capability,
            metadata,
        })
    }

    pub fn preprocessor(&self) -> &ColumnPreprocessor {
        &self.preprocessor
    }

    pub fn capability(&self) -> &PriorityCapability {
        &self.capability
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

/// Loaded severity regressor with its preprocessing
pub struct SeverityModel {
    preprocessor: ColumnPreprocessor,
    regressor: Box<dyn Regressor>,
    metadata: ModelMetadata,
}

impl SeverityModel {
    /// Load and check a severity artifact from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelLoadError> {
        let (artifact, digest) = read_artifact(path.as_ref())?;
        Self::from_artifact(artifact, Some(digest))
    }

    pub fn from_artifact(
        artifact: ModelArtifact,
        sha256: Option<String>,
    ) -> Result<Self, ModelLoadError> {
        let ModelArtifact {
            name,
            version,
            preprocessor,
            estimator,
        } = artifact;

        preprocessor.check(&name)?;
        let width = preprocessor.output_width();
        let kind = estimator.kind();

        let regressor: Box<dyn Regressor> = match estimator {
            EstimatorSpec::LinearRegression {
                coefficients,
                intercept,
            } => Box::new(LinearRegressor::new(&name, coefficients, intercept, width)?),
            _ => {
                return Err(ModelLoadError::invalid(
                    &name,
                    format!("a {} cannot serve as the severity model", kind),
                ))
            }
        };

        let metadata = ModelMetadata {
            name,
            version,
            role: ModelRole::Severity,
            kind,
            classes: None,
            supports_probabilities: false,
            n_features: width,
            sha256,
            loaded_at: Utc::now(),
        };

        Ok(Self {
            preprocessor,
            regressor,
            metadata,
        })
    }

    pub fn preprocessor(&self) -> &ColumnPreprocessor {
        &self.preprocessor
    }

    pub fn regressor(&self) -> &dyn Regressor {
        self.regressor.as_ref()
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}
