use crate::ml::error::{InferenceError, ModelLoadError};
use crate::ml::models::ModelKind;
use crate::models::{Priority, PriorityProbabilities};
use ndarray::{Array1, Array2, ArrayView1};

/// Trait for priority classifiers
pub trait Classifier: Send + Sync {
    /// Labels the classifier was fit on, in class-index order
    fn classes(&self) -> &[Priority];

    /// Predict a class index for one encoded sample
    fn predict(&self, features: ArrayView1<f64>) -> Result<usize, InferenceError>;

    /// Model kind
    fn model_kind(&self) -> ModelKind;
}

/// Classifiers that can also export class probabilities
pub trait ProbabilisticClassifier: Classifier {
    /// One probability per class, in class-index order
    fn predict_proba(&self, features: ArrayView1<f64>) -> Result<Array1<f64>, InferenceError>;
}

/// The label-predicting capability of a loaded priority model.
///
/// Resolved once when the artifact is loaded, never per request.
pub enum PriorityCapability {
    WithProbabilities(Box<dyn ProbabilisticClassifier>),
    LabelOnly(Box<dyn Classifier>),
}

impl PriorityCapability {
    pub fn classes(&self) -> &[Priority] {
        match self {
            PriorityCapability::WithProbabilities(model) => model.classes(),
            PriorityCapability::LabelOnly(model) => model.classes(),
        }
    }

    pub fn supports_probabilities(&self) -> bool {
        matches!(self, PriorityCapability::WithProbabilities(_))
    }

    pub fn model_kind(&self) -> ModelKind {
        match self {
            PriorityCapability::WithProbabilities(model) => model.model_kind(),
            PriorityCapability::LabelOnly(model) => model.model_kind(),
        }
    }

    /// Predict the priority label for one encoded sample
    pub fn predict_label(&self, features: ArrayView1<f64>) -> Result<Priority, InferenceError> {
        let index = match self {
            PriorityCapability::WithProbabilities(model) => model.predict(features)?,
            PriorityCapability::LabelOnly(model) => model.predict(features)?,
        };
        Ok(self.classes()[index])
    }

    /// Probability per label, or `None` for label-only classifiers
    pub fn predict_probabilities(
        &self,
        features: ArrayView1<f64>,
    ) -> Result<Option<PriorityProbabilities>, InferenceError> {
        match self {
            PriorityCapability::WithProbabilities(model) => {
                let proba = model.predict_proba(features)?;
                Ok(Some(
                    model
                        .classes()
                        .iter()
                        .copied()
                        .zip(proba.iter().copied())
                        .collect(),
                ))
            }
            PriorityCapability::LabelOnly(_) => Ok(None),
        }
    }
}

/// Shared linear decision function `W x + b`, one row per score
#[derive(Debug, Clone)]
pub struct LinearDecision {
    coefficients: Array2<f64>,
    intercepts: Array1<f64>,
}

impl LinearDecision {
    pub fn new(
        artifact: &str,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
        input_width: usize,
    ) -> Result<Self, ModelLoadError> {
        let rows = coefficients.len();
        if rows == 0 {
            return Err(ModelLoadError::invalid(artifact, "estimator has no coefficients"));
        }
        if intercepts.len() != rows {
            return Err(ModelLoadError::invalid(
                artifact,
                format!(
                    "estimator has {} coefficient rows but {} intercepts",
                    rows,
                    intercepts.len()
                ),
            ));
        }
        if let Some(row) = coefficients.iter().find(|row| row.len() != input_width) {
            return Err(ModelLoadError::invalid(
                artifact,
                format!(
                    "coefficient row has width {} but the preprocessor emits {}",
                    row.len(),
                    input_width
                ),
            ));
        }
        let finite = coefficients.iter().flatten().chain(intercepts.iter());
        if finite.into_iter().any(|v| !v.is_finite()) {
            return Err(ModelLoadError::invalid(
                artifact,
                "estimator parameters must be finite",
            ));
        }

        let flat: Vec<f64> = coefficients.into_iter().flatten().collect();
        let coefficients = Array2::from_shape_vec((rows, input_width), flat)
            .map_err(|e| ModelLoadError::invalid(artifact, e.to_string()))?;

        Ok(Self {
            coefficients,
            intercepts: Array1::from_vec(intercepts),
        })
    }

    pub fn rows(&self) -> usize {
        self.intercepts.len()
    }

    pub fn decision(&self, features: ArrayView1<f64>) -> Array1<f64> {
        self.coefficients.dot(&features) + &self.intercepts
    }
}

/// Validate and parse a class list for a decision function with `rows` outputs
fn parse_classes(
    artifact: &str,
    classes: &[String],
    rows: usize,
) -> Result<Vec<Priority>, ModelLoadError> {
    let mut parsed = Vec::with_capacity(classes.len());
    for class in classes {
        let label: Priority = class.parse().map_err(|_| {
            ModelLoadError::invalid(artifact, format!("unknown priority label {:?}", class))
        })?;
        if parsed.contains(&label) {
            return Err(ModelLoadError::invalid(
                artifact,
                format!("priority label {} listed twice", label),
            ));
        }
        parsed.push(label);
    }

    let binary = parsed.len() == 2 && rows == 1;
    if parsed.len() < 2 || !(binary || rows == parsed.len()) {
        return Err(ModelLoadError::invalid(
            artifact,
            format!(
                "{} classes cannot be scored by {} decision rows",
                parsed.len(),
                rows
            ),
        ));
    }

    Ok(parsed)
}

/// Index of the largest score; the first one wins ties
fn argmax(scores: &Array1<f64>) -> usize {
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate() {
        if score > scores[best] {
            best = i;
        }
    }
    best
}

fn binary_or_argmax(scores: &Array1<f64>) -> usize {
    if scores.len() == 1 {
        usize::from(scores[0] > 0.0)
    } else {
        argmax(scores)
    }
}

/// Logistic regression. Binary models (one decision row) use the sigmoid,
/// multinomial models use the softmax.
pub struct LogisticRegressionClassifier {
    decision: LinearDecision,
    classes: Vec<Priority>,
}

impl LogisticRegressionClassifier {
    pub fn new(
        artifact: &str,
        decision: LinearDecision,
        classes: &[String],
    ) -> Result<Self, ModelLoadError> {
        let classes = parse_classes(artifact, classes, decision.rows())?;
        Ok(Self { decision, classes })
    }
}

impl Classifier for LogisticRegressionClassifier {
    fn classes(&self) -> &[Priority] {
        &self.classes
    }

    fn predict(&self, features: ArrayView1<f64>) -> Result<usize, InferenceError> {
        let scores = self.decision.decision(features);
        if scores.iter().any(|s| !s.is_finite()) {
            return Err(InferenceError::NonFinite { model: "priority" });
        }
        Ok(binary_or_argmax(&scores))
    }

    fn model_kind(&self) -> ModelKind {
        ModelKind::LogisticRegression
    }
}

impl ProbabilisticClassifier for LogisticRegressionClassifier {
    fn predict_proba(&self, features: ArrayView1<f64>) -> Result<Array1<f64>, InferenceError> {
        let scores = self.decision.decision(features);
        if scores.iter().any(|s| !s.is_finite()) {
            return Err(InferenceError::NonFinite { model: "priority" });
        }

        if scores.len() == 1 {
            let positive = sigmoid(scores[0]);
            return Ok(Array1::from_vec(vec![1.0 - positive, positive]));
        }

        Ok(softmax(&scores))
    }
}

/// Linear support vector classifier. Exposes labels only.
pub struct LinearSvcClassifier {
    decision: LinearDecision,
    classes: Vec<Priority>,
}

impl LinearSvcClassifier {
    pub fn new(
        artifact: &str,
        decision: LinearDecision,
        classes: &[String],
    ) -> Result<Self, ModelLoadError> {
        let classes = parse_classes(artifact, classes, decision.rows())?;
        Ok(Self { decision, classes })
    }
}

impl Classifier for LinearSvcClassifier {
    fn classes(&self) -> &[Priority] {
        &self.classes
    }

    fn predict(&self, features: ArrayView1<f64>) -> Result<usize, InferenceError> {
        let scores = self.decision.decision(features);
        if scores.iter().any(|s| !s.is_finite()) {
            return Err(InferenceError::NonFinite { model: "priority" });
        }
        Ok(binary_or_argmax(&scores))
    }

    fn model_kind(&self) -> ModelKind {
        ModelKind::LinearSvc
    }
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

fn softmax(scores: &Array1<f64>) -> Array1<f64> {
    let max = scores.fold(f64::NEG_INFINITY, |acc, &s| acc.max(s));
    let exp = scores.mapv(|s| (s - max).exp());
    let total = exp.sum();
    exp / total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn three_class_decision() -> LinearDecision {
        LinearDecision::new(
            "test",
            vec![vec![2.0, 0.0], vec![0.0, 2.0], vec![-1.0, -1.0]],
            vec![0.0, 0.0, 0.5],
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_multinomial_logistic_regression() {
        let model =
            LogisticRegressionClassifier::new("test", three_class_decision(), &labels(&["P1", "P2", "P3"]))
                .unwrap();
        let x = Array1::from_vec(vec![1.0, 0.0]);

        assert_eq!(model.predict(x.view()).unwrap(), 0);

        let proba = model.predict_proba(x.view()).unwrap();
        assert_eq!(proba.len(), 3);
        assert!((proba.sum() - 1.0).abs() < 1e-9);
        assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
        assert_eq!(argmax(&proba), 0);
    }

    #[test]
    fn test_binary_logistic_regression_uses_sigmoid() {
        let decision = LinearDecision::new("test", vec![vec![1.0]], vec![0.0], 1).unwrap();
        let model =
            LogisticRegressionClassifier::new("test", decision, &labels(&["P2", "P1"])).unwrap();

        let x = Array1::from_vec(vec![3.0]);
        assert_eq!(model.predict(x.view()).unwrap(), 1);

        let proba = model.predict_proba(x.view()).unwrap();
        assert!((proba[1] - sigmoid(3.0)).abs() < 1e-12);
        assert!((proba.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_capability_surfaces_labelled_probabilities() {
        let model =
            LogisticRegressionClassifier::new("test", three_class_decision(), &labels(&["P1", "P2", "P3"]))
                .unwrap();
        let capability = PriorityCapability::WithProbabilities(Box::new(model));
        let x = Array1::from_vec(vec![0.0, 1.0]);

        assert!(capability.supports_probabilities());
        assert_eq!(capability.predict_label(x.view()).unwrap(), Priority::P2);

        let probs = capability.predict_probabilities(x.view()).unwrap().unwrap();
        assert_eq!(probs.len(), 3);
        assert!((probs.values().sum::<f64>() - 1.0).abs() < 1e-6);
        assert!(probs[&Priority::P2] > probs[&Priority::P1]);
    }

    #[test]
    fn test_label_only_capability() {
        let model =
            LinearSvcClassifier::new("test", three_class_decision(), &labels(&["P1", "P2", "P3"]))
                .unwrap();
        let capability = PriorityCapability::LabelOnly(Box::new(model));
        let x = Array1::from_vec(vec![-1.0, -1.0]);

        assert!(!capability.supports_probabilities());
        assert_eq!(capability.predict_label(x.view()).unwrap(), Priority::P3);
        assert_eq!(capability.predict_probabilities(x.view()).unwrap(), None);
        assert_eq!(capability.model_kind(), ModelKind::LinearSvc);
    }

    #[test]
    fn test_decision_shape_is_checked() {
        assert!(LinearDecision::new("test", vec![vec![1.0, 2.0]], vec![0.0], 3).is_err());
        assert!(LinearDecision::new("test", vec![vec![1.0]], vec![0.0, 1.0], 1).is_err());
        assert!(LinearDecision::new("test", vec![], vec![], 1).is_err());
        assert!(LinearDecision::new("test", vec![vec![f64::NAN]], vec![0.0], 1).is_err());
    }

    #[test]
    fn test_classes_are_checked() {
        let err = LogisticRegressionClassifier::new(
            "test",
            three_class_decision(),
            &labels(&["P1", "P2", "P9"]),
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("unknown priority label"));

        assert!(LogisticRegressionClassifier::new(
            "test",
            three_class_decision(),
            &labels(&["P1", "P1", "P2"])
        )
        .is_err());

        assert!(
            LogisticRegressionClassifier::new("test", three_class_decision(), &labels(&["P1", "P2"]))
                .is_err()
        );
    }

    #[test]
    fn test_softmax_is_stable_for_large_scores() {
        let proba = softmax(&Array1::from_vec(vec![1000.0, 1000.0]));
        assert!((proba[0] - 0.5).abs() < 1e-12);
        assert!((proba[1] - 0.5).abs() < 1e-12);
    }
}
