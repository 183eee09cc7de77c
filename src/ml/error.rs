use std::path::PathBuf;
use thiserror::Error;

/// Failure while scoring an already-validated record
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// The encoder saw a category it was not fit on and has no fallback
    #[error("unknown category {value:?} for feature `{field}`")]
    UnknownCategory { field: String, value: String },

    /// A feature value does not fit the encoding declared for its column
    #[error("feature `{field}` cannot be encoded: expected {expected}")]
    FeatureMismatch {
        field: String,
        expected: &'static str,
    },

    /// The estimator produced NaN or infinity
    #[error("{model} model produced a non-finite output")]
    NonFinite { model: &'static str },
}

/// Failure while loading a persisted model artifact. Always fatal at startup.
#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("failed to read model artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("model artifact `{artifact}` is invalid: {reason}")]
    Invalid { artifact: String, reason: String },
}

impl ModelLoadError {
    pub(crate) fn invalid(artifact: &str, reason: impl Into<String>) -> Self {
        ModelLoadError::Invalid {
            artifact: artifact.to_string(),
            reason: reason.into(),
        }
    }
}
