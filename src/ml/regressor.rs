use crate::ml::error::{InferenceError, ModelLoadError};
use crate::ml::models::ModelKind;
use ndarray::{Array1, ArrayView1};

/// Trait for severity regressors
pub trait Regressor: Send + Sync {
    /// Predict a raw, unclamped score for one encoded sample
    fn predict(&self, features: ArrayView1<f64>) -> Result<f64, InferenceError>;

    /// Model kind
    fn model_kind(&self) -> ModelKind;
}

/// Ordinary linear regression `w . x + b`
#[derive(Debug, Clone)]
pub struct LinearRegressor {
    coefficients: Array1<f64>,
    intercept: f64,
}

impl LinearRegressor {
    pub fn new(
        artifact: &str,
        coefficients: Vec<f64>,
        intercept: f64,
        input_width: usize,
    ) -> Result<Self, ModelLoadError> {
        if coefficients.len() != input_width {
            return Err(ModelLoadError::invalid(
                artifact,
                format!(
                    "regressor has {} coefficients but the preprocessor emits {}",
                    coefficients.len(),
                    input_width
                ),
            ));
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelLoadError::invalid(
                artifact,
                "regressor parameters must be finite",
            ));
        }

        Ok(Self {
            coefficients: Array1::from_vec(coefficients),
            intercept,
        })
    }
}

impl Regressor for LinearRegressor {
    fn predict(&self, features: ArrayView1<f64>) -> Result<f64, InferenceError> {
        let score = self.coefficients.dot(&features) + self.intercept;
        if !score.is_finite() {
            return Err(InferenceError::NonFinite { model: "severity" });
        }
        Ok(score)
    }

    fn model_kind(&self) -> ModelKind {
        ModelKind::LinearRegression
    }
}
