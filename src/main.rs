use anyhow::Context;
use pawsight::{
    api::{build_router, AppState},
    config::Config,
    ml::InferenceEngine,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration before logging so the level and format apply
    let config = Config::load().context("failed to load configuration")?;

    // Initialize tracing
    let json_logs = config.observability.json_logs;
    let default_filter = format!(
        "pawsight={level},tower_http={level}",
        level = config.observability.log_level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!(
        service = %config.observability.service_name,
        "Starting PAWSIGHT v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize Prometheus metrics
    if config.observability.prometheus_enabled {
        if let Err(e) = pawsight::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
            tracing::warn!("Continuing without metrics");
        } else {
            tracing::info!("✅ Prometheus metrics initialized");
        }
    } else {
        tracing::info!("⚠️  Prometheus metrics disabled in configuration");
    }

    // Load both models before binding; any failure is fatal
    let engine = InferenceEngine::load(&config.models).context("failed to load model artifacts")?;
    tracing::info!(
        probabilities = engine.supports_probabilities(),
        labels = ?engine.labels(),
        "✅ Inference engine ready"
    );

    let app_state = AppState::new(Arc::new(engine))
        .with_metrics(config.observability.prometheus_enabled);
    let app = build_router(app_state);

    // Start HTTP server
    let http_addr = config.bind_addr();
    let http_listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .with_context(|| format!("failed to bind {}", http_addr))?;

    tracing::info!("🚀 HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   Predict: http://{}/predict", http_addr);
    tracing::info!("   Models: http://{}/v1/models", http_addr);

    axum::serve(http_listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("🛑 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
