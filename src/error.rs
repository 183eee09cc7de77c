use crate::ml::error::InferenceError;
use crate::ml::vector::ContractViolation;
use crate::validation::{ValidationError, ValidationErrors};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// The request body violates the feature schema
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// The request body is not parseable JSON
    #[error("Malformed request: {0}")]
    BadRequest(String),

    /// A model could not score a validated record
    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    /// Validator and vectorizer disagree
    #[error("{0}")]
    ContractViolation(#[from] ContractViolation),
}

impl AppError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ContractViolation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "MALFORMED_REQUEST",
            AppError::Inference(_) => "INFERENCE_ERROR",
            AppError::ContractViolation(_) => "INTERNAL_CONTRACT_VIOLATION",
        }
    }

    /// Short label used for the failure metric
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::BadRequest(_) => "malformed",
            AppError::Inference(_) => "inference",
            AppError::ContractViolation(_) => "contract",
        }
    }
}

/// Convert AppError to HTTP response
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(
                error_code = error_code,
                status_code = status.as_u16(),
                message = %message,
                "Request error"
            );
        } else {
            tracing::warn!(
                error_code = error_code,
                status_code = status.as_u16(),
                message = %message,
                "Request rejected"
            );
        }

        let mut error = json!({
            "code": error_code,
            "message": message,
            "status": status.as_u16(),
        });

        if let AppError::Validation(errors) = &self {
            error["details"] = json!(errors.errors());
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::Validation(err)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.into())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;
