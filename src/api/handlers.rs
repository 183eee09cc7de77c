use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::metrics::gather_metrics;
use crate::ml::ModelMetadata;
use crate::models::PredictionResult;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::Value;

/// Health check endpoint. Constant time; never touches the models.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Score one incident record
pub async fn predict(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResult>> {
    let Json(raw) = payload.map_err(|rejection| {
        let err = AppError::BadRequest(rejection.body_text());
        state.predictions.record_rejection(&err);
        err
    })?;

    let result = state.predictions.predict(&raw)?;
    Ok(Json(result))
}

/// Metadata for the loaded model artifacts
pub async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.predictions.model_metadata(),
    })
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelMetadata>,
}

/// Prometheus text exposition
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        gather_metrics(),
    )
}
