//! Result composition: severity display rules and the recommended action.
//!
//! These are the only implementations of these rules; the CLI calls them
//! rather than re-deriving them.

use crate::models::{Priority, PriorityProbabilities, PredictionResult, RecommendedAction};

/// Lower bound of the displayed severity scale
pub const SEVERITY_MIN: f64 = 0.0;

/// Upper bound of the displayed severity scale
pub const SEVERITY_MAX: f64 = 100.0;

/// Severity at or above which any incident is dispatched immediately
pub const DISPATCH_THRESHOLD: f64 = 75.0;

/// Severity at or above which any incident gets a prompt response
pub const RESPOND_THRESHOLD: f64 = 45.0;

/// Clamp a raw regression output to the display scale. NaN maps to the floor.
pub fn clamp_severity(raw: f64) -> f64 {
    if raw.is_nan() {
        return SEVERITY_MIN;
    }
    raw.max(SEVERITY_MIN).min(SEVERITY_MAX)
}

/// Round to two decimals. Ties go to even on the exact binary value.
pub fn round_severity(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Clamped then rounded severity, the only form ever shown to callers
pub fn display_severity(raw: f64) -> f64 {
    round_severity(clamp_severity(raw))
}

/// Map a priority and a severity to operator guidance.
///
/// `severity` is normalized with [`display_severity`] first, which is a
/// no-op for values that already went through it.
pub fn recommended_action(priority: Priority, severity: f64) -> RecommendedAction {
    let severity = display_severity(severity);

    if priority == Priority::P1 || severity >= DISPATCH_THRESHOLD {
        RecommendedAction::DispatchImmediately
    } else if priority == Priority::P2 || severity >= RESPOND_THRESHOLD {
        RecommendedAction::RespondSoon
    } else {
        RecommendedAction::Monitor
    }
}

/// Build the response payload from raw model outputs
pub fn compose(
    priority: Priority,
    raw_severity: f64,
    probabilities: Option<PriorityProbabilities>,
) -> PredictionResult {
    let severity = display_severity(raw_severity);

    PredictionResult {
        priority_prediction: priority,
        severity_prediction: severity,
        priority_probabilities: probabilities,
        recommended_action: recommended_action(priority, severity),
    }
}
