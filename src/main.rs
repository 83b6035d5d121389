//! Image Classifier API server binary
//!
//! Loads the model and label list once, then serves `GET /` and `POST /predict`.
//! Refuses to start if either artifact is missing or unparsable.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use classifier_server::config::{Config, LogFormat};
use classifier_server::model::OnnxClassifier;
use classifier_server::{create_router, AppState, LabelList, Predictor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize logging
    init_tracing(config.log_format);

    tracing::info!("Image Classifier API starting...");

    let labels = LabelList::load(&config.class_names_path)
        .with_context(|| format!("loading class names from {}", config.class_names_path.display()))?;
    tracing::info!(
        count = labels.len(),
        "Loaded class names: {:?}",
        labels.iter().collect::<Vec<_>>()
    );

    let classifier = OnnxClassifier::load(&config.model_path, config.input)
        .with_context(|| format!("loading model from {}", config.model_path.display()))?;

    let predictor = Predictor::new(Arc::new(classifier), labels);
    tracing::info!(model = %predictor.model_name(), input = ?config.input, "Model ready");
    let state = AppState::new(predictor, config.clone());

    // Build router
    let app = create_router(state);

    // Start server
    let addr: SocketAddr = config.bind_address().parse()
        .with_context(|| format!("invalid bind address {}", config.bind_address()))?;
    let listener = tokio::net::TcpListener::bind(addr).await
        .with_context(|| format!("binding {}", addr))?;

    tracing::info!("🚀 Server listening on http://{}", addr);

    let started_at = chrono::Utc::now();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(started_at))
        .await?;

    tracing::info!("Server shut down cleanly");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "classifier_server=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal(started_at: chrono::DateTime<chrono::Utc>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C handler: {}", e);
        std::future::pending::<()>().await;
    }

    let uptime = chrono::Utc::now().signed_duration_since(started_at);
    tracing::info!(
        uptime_secs = uptime.num_seconds(),
        "Shutdown signal received, stopping server gracefully"
    );
}
