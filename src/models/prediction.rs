use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Discrete urgency tier assigned by the priority model
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    AsRefStr,
    EnumIter,
)]
pub enum Priority {
    P1, // Urgent - animal in immediate danger
    P2, // Needs assessment soon
    P3, // Routine follow-up
}

/// Per-label probability mapping surfaced by probabilistic classifiers
pub type PriorityProbabilities = BTreeMap<Priority, f64>;

/// Operator guidance derived from priority and displayed severity
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, AsRefStr,
)]
pub enum RecommendedAction {
    #[serde(rename = "Dispatch immediately")]
    #[strum(serialize = "Dispatch immediately")]
    DispatchImmediately,

    #[serde(rename = "Respond soon / assess")]
    #[strum(serialize = "Respond soon / assess")]
    RespondSoon,

    #[serde(rename = "Monitor / schedule follow-up")]
    #[strum(serialize = "Monitor / schedule follow-up")]
    Monitor,
}

impl RecommendedAction {
    /// Short label, stable across display-string changes
    pub fn code(&self) -> &'static str {
        match self {
            RecommendedAction::DispatchImmediately => "dispatch",
            RecommendedAction::RespondSoon => "respond",
            RecommendedAction::Monitor => "monitor",
        }
    }
}

/// Response payload of a prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub priority_prediction: Priority,

    /// Severity clamped to [0, 100] and rounded to two decimals
    pub severity_prediction: f64,

    /// `None` when the priority model cannot export probabilities
    pub priority_probabilities: Option<PriorityProbabilities>,

    pub recommended_action: RecommendedAction,
}
