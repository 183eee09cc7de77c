//! Prometheus metrics for the prediction service.
//!
//! All collectors live in one process-wide registry and are exported as text
//! from `GET /metrics`.
//!
//! # Example
//! ```no_run
//! use pawsight::metrics::PREDICTIONS_TOTAL;
//!
//! PREDICTIONS_TOTAL.with_label_values(&["P2", "respond"]).inc();
//! ```

use lazy_static::lazy_static;
use prometheus::{
    core::Collector, CounterVec, GaugeVec, Histogram, HistogramOpts, Opts, Registry,
};

const NAMESPACE: &str = "pawsight";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Successful predictions
    ///
    /// Labels: priority, action
    pub static ref PREDICTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("predictions_total", "Total number of successful predictions")
            .namespace(NAMESPACE),
        &["priority", "action"]
    ).expect("Failed to create PREDICTIONS_TOTAL metric");

    /// Failed predictions
    ///
    /// Labels: kind (validation, malformed, inference, contract)
    pub static ref PREDICTION_FAILURES_TOTAL: CounterVec = CounterVec::new(
        Opts::new("prediction_failures_total", "Total number of failed predictions")
            .namespace(NAMESPACE),
        &["kind"]
    ).expect("Failed to create PREDICTION_FAILURES_TOTAL metric");

    /// Time spent validating, vectorizing and scoring one record
    pub static ref INFERENCE_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "inference_duration_seconds",
            "Prediction pipeline duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.00005, 0.0001, 0.00025, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.05]),
    ).expect("Failed to create INFERENCE_DURATION_SECONDS metric");

    /// Distribution of displayed severity scores
    pub static ref SEVERITY_SCORE: Histogram = Histogram::with_opts(
        HistogramOpts::new("severity_score", "Displayed severity of successful predictions")
            .namespace(NAMESPACE)
            .buckets(vec![10.0, 20.0, 30.0, 45.0, 60.0, 75.0, 90.0, 100.0]),
    ).expect("Failed to create SEVERITY_SCORE metric");

    /// Loaded model artifacts, always 1
    ///
    /// Labels: role, name, version
    pub static ref MODELS_INFO: GaugeVec = GaugeVec::new(
        Opts::new("model_info", "Loaded model artifacts").namespace(NAMESPACE),
        &["role", "name", "version"]
    ).expect("Failed to create MODELS_INFO metric");
}

fn register<C: Collector + Clone + 'static>(collector: &C) -> Result<(), prometheus::Error> {
    match PROMETHEUS_REGISTRY.register(Box::new(collector.clone())) {
        Ok(()) | Err(prometheus::Error::AlreadyReg) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Register all collectors. Safe to call more than once.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    register(&*PREDICTIONS_TOTAL)?;
    register(&*PREDICTION_FAILURES_TOTAL)?;
    register(&*INFERENCE_DURATION_SECONDS)?;
    register(&*SEVERITY_SCORE)?;
    register(&*MODELS_INFO)?;
    Ok(())
}

/// Get metrics as Prometheus text format
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}
