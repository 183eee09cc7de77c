//! Integration tests for artifact loading and the inference pipeline
//!
//! These tests verify:
//! - The shipped sample artifacts load and agree on the feature schema
//! - Startup fails on missing, corrupt or inconsistent artifacts
//! - Both models see the same vector for a record

mod common;

use common::*;
use pawsight::config::ModelsConfig;
use pawsight::ml::{
    vectorize, ColumnEncoding, EstimatorSpec, InferenceEngine, ModelLoadError, PredictionService,
};
use pawsight::models::{IncidentRecord, Preset, Priority};
use pawsight::schema::feature_columns;
use pawsight::validate;
use strum::IntoEnumIterator;

#[test]
fn test_sample_artifacts_load() {
    let engine = sample_engine();

    assert!(engine.supports_probabilities());
    assert_eq!(engine.labels(), &[Priority::P1, Priority::P2, Priority::P3]);

    let metadata = engine.metadata();
    assert_eq!(metadata[0].name, "priority_model_tirana_v2");
    assert_eq!(metadata[1].name, "severity_model_tirana_v2");
    assert_eq!(metadata[0].n_features, metadata[1].n_features);
}

#[test]
fn test_every_preset_scores_within_bounds() {
    let service = PredictionService::new(sample_engine());

    for preset in Preset::iter() {
        let body = serde_json::to_value(IncidentRecord::preset(preset)).unwrap();
        let result = service.predict(&body).unwrap();

        assert!((0.0..=100.0).contains(&result.severity_prediction));
        let probs = result.priority_probabilities.unwrap();
        assert_eq!(probs.len(), 3);
        assert!((probs.values().sum::<f64>() - 1.0).abs() < 1e-6);
        assert_eq!(
            result.recommended_action,
            pawsight::recommended_action(result.priority_prediction, result.severity_prediction)
        );
    }
}

#[test]
fn test_presets_escalate() {
    let service = PredictionService::new(sample_engine());
    let score = |preset| {
        let body = serde_json::to_value(IncidentRecord::preset(preset)).unwrap();
        service.predict(&body).unwrap()
    };

    let low = score(Preset::Low);
    let medium = score(Preset::Medium);
    let high = score(Preset::High);

    assert_eq!(low.priority_prediction, Priority::P3);
    assert_eq!(medium.priority_prediction, Priority::P2);
    assert_eq!(high.priority_prediction, Priority::P1);
    assert!(low.severity_prediction < medium.severity_prediction);
    assert!(medium.severity_prediction < high.severity_prediction);
}

#[test]
fn test_scores_are_deterministic() {
    let engine = sample_engine();
    let record = validate(&kombinat_cat()).unwrap();
    let vector = vectorize(&record).unwrap();

    let first = engine.score(&vector).unwrap();
    let second = engine.score(&vector).unwrap();
    assert_eq!(first, second);
    assert_eq!(engine.predict_label(&vector).unwrap(), first.priority);
}

#[test]
fn test_missing_artifact_is_fatal() {
    let config = ModelsConfig {
        priority_model_path: "/nonexistent/priority.json".to_string(),
        ..sample_models_config()
    };

    let err = InferenceEngine::load(&config).err().unwrap();
    assert!(matches!(err, ModelLoadError::Io { .. }));
}

#[test]
fn test_reordered_columns_are_fatal() {
    let mut artifact = label_only_priority_artifact();
    artifact.preprocessor.columns.swap(9, 10);

    let priority = write_artifact(&artifact);
    let config = ModelsConfig {
        priority_model_path: priority.path().to_string_lossy().into_owned(),
        ..sample_models_config()
    };

    let err = InferenceEngine::load(&config).err().unwrap();
    assert!(err.to_string().contains("feature schema"));
}

#[test]
fn test_coefficient_width_mismatch_is_fatal() {
    let mut artifact = constant_severity_artifact(10.0);
    if let EstimatorSpec::LinearRegression { coefficients, .. } = &mut artifact.estimator {
        coefficients.pop();
    }

    let severity = write_artifact(&artifact);
    let config = ModelsConfig {
        severity_model_path: severity.path().to_string_lossy().into_owned(),
        ..sample_models_config()
    };

    assert!(matches!(
        InferenceEngine::load(&config),
        Err(ModelLoadError::Invalid { .. })
    ));
}

#[test]
fn test_sample_preprocessors_follow_schema() {
    let text = std::fs::read_to_string(sample_models_config().priority_model_path).unwrap();
    let artifact: pawsight::ml::ModelArtifact = serde_json::from_str(&text).unwrap();

    let names: Vec<&str> = artifact
        .preprocessor
        .columns
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, feature_columns().collect::<Vec<_>>());

    // categoricals are one-hot, numerics scaled
    assert!(matches!(
        artifact.preprocessor.columns[0].encoding,
        ColumnEncoding::OneHot { .. }
    ));
    assert!(matches!(
        artifact.preprocessor.columns[20].encoding,
        ColumnEncoding::Standard { .. }
    ));
}
