//! Common test utilities for the prediction service
//!
//! Builds engines from the shipped sample artifacts or from small in-code
//! artifacts written to temp files, and drives the router in-process.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use pawsight::{
    api::{build_router, AppState},
    config::ModelsConfig,
    ml::{
        ColumnEncoding, ColumnPreprocessor, ColumnSpec, EstimatorSpec, HandleUnknown,
        InferenceEngine, ModelArtifact,
    },
    schema::FEATURE_SCHEMA,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tower::ServiceExt;

/// Paths of the sample artifacts under `models/`
pub fn sample_models_config() -> ModelsConfig {
    let root = env!("CARGO_MANIFEST_DIR");
    ModelsConfig {
        priority_model_path: format!("{}/models/priority_model_tirana_v2.json", root),
        severity_model_path: format!("{}/models/severity_model_tirana_v2.json", root),
    }
}

pub fn sample_engine() -> Arc<InferenceEngine> {
    Arc::new(InferenceEngine::load(&sample_models_config()).expect("sample artifacts load"))
}

pub fn sample_app() -> Router {
    build_router(AppState::new(sample_engine()))
}

/// The calm cat in Kombinat used as the reference scenario
pub fn kombinat_cat() -> Value {
    json!({
        "neighborhood": "Kombinat",
        "animal_type": "Cat",
        "age_group": "Adult",
        "behavior": "Calm",
        "mobility": "Normal",
        "visible_injury": "No",
        "traffic_risk": "Low",
        "weather": "Clear",
        "report_channel": "App",
        "animal_count": 1,
        "near_traffic": 0,
        "near_school": 0,
        "very_thin": 0,
        "bleeding": 0,
        "open_wound": 0,
        "pregnant_or_nursing": 0,
        "has_collar": 1,
        "reporter_confidence": 3,
        "report_hour": 14,
        "report_dayofweek": 3,
        "report_month": 5
    })
}

/// Passthrough numerics and one-hot categoricals with strict unknown handling
pub fn strict_preprocessor() -> ColumnPreprocessor {
    ColumnPreprocessor {
        columns: FEATURE_SCHEMA
            .iter()
            .map(|spec| ColumnSpec {
                name: spec.name.to_string(),
                encoding: match spec.kind {
                    pawsight::schema::FieldKind::Categorical { known } if !known.is_empty() => {
                        ColumnEncoding::OneHot {
                            categories: known.iter().map(|s| s.to_string()).collect(),
                            handle_unknown: HandleUnknown::Error,
                        }
                    }
                    pawsight::schema::FieldKind::Categorical { .. } => ColumnEncoding::OneHot {
                        categories: vec!["Kombinat".to_string()],
                        handle_unknown: HandleUnknown::Ignore,
                    },
                    _ => ColumnEncoding::Passthrough,
                },
            })
            .collect(),
    }
}

/// Label-only classifier: P1 iff bleeding, else P3
pub fn label_only_priority_artifact() -> ModelArtifact {
    let preprocessor = strict_preprocessor();
    let width = preprocessor.output_width();
    let bleeding = width - 8;

    let mut coefficients = vec![vec![0.0; width]; 3];
    coefficients[0][bleeding] = 3.0;
    ModelArtifact {
        name: "priority_svc".to_string(),
        version: "0.1.0".to_string(),
        preprocessor,
        estimator: EstimatorSpec::LinearSvc {
            classes: vec!["P1".to_string(), "P2".to_string(), "P3".to_string()],
            coefficients,
            intercepts: vec![-1.0, -2.0, 0.0],
        },
    }
}

/// Severity that is always `intercept`
pub fn constant_severity_artifact(intercept: f64) -> ModelArtifact {
    let preprocessor = strict_preprocessor();
    let width = preprocessor.output_width();
    ModelArtifact {
        name: "severity_constant".to_string(),
        version: "0.1.0".to_string(),
        preprocessor,
        estimator: EstimatorSpec::LinearRegression {
            coefficients: vec![0.0; width],
            intercept,
        },
    }
}

/// Write an artifact to a temp file; keep the handle alive while loading
pub fn write_artifact(artifact: &ModelArtifact) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(serde_json::to_string_pretty(artifact).unwrap().as_bytes())
        .expect("write artifact");
    file
}

pub fn engine_from(priority: &ModelArtifact, severity: &ModelArtifact) -> Arc<InferenceEngine> {
    let priority_file = write_artifact(priority);
    let severity_file = write_artifact(severity);
    let config = ModelsConfig {
        priority_model_path: priority_file.path().to_string_lossy().into_owned(),
        severity_model_path: severity_file.path().to_string_lossy().into_owned(),
    };
    Arc::new(InferenceEngine::load(&config).expect("test artifacts load"))
}

/// Send a request through the router, returning status and body
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_str(&body).unwrap())
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_str(&body).unwrap())
}

/// Helper function to parse Prometheus exposition format
/// Returns a map of metric lines for easy assertion
pub fn parse_prometheus_output(output: &str) -> HashMap<String, Vec<String>> {
    let mut metrics = HashMap::new();
    let mut current_metric = String::new();

    for line in output.lines() {
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with("# HELP") || line.starts_with("# TYPE") {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() >= 3 {
                current_metric = parts[2].to_string();
                metrics
                    .entry(current_metric.clone())
                    .or_insert_with(Vec::new)
                    .push(line.to_string());
            }
        } else if !line.starts_with('#') && !current_metric.is_empty() {
            metrics
                .entry(current_metric.clone())
                .or_insert_with(Vec::new)
                .push(line.to_string());
        }
    }

    metrics
}
