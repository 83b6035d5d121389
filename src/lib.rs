//! Image Classifier API
//!
//! Serves a single pretrained image classifier over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     CLASSIFIER SERVER                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  POST /predict (multipart "file")                            │
//! │        │                                                     │
//! │        ▼                                                     │
//! │  decode ─► RGB ─► resize ─► [1, ...] f32 ─► ONNX ─► top-1    │
//! │                                                   │          │
//! │                         class_names.json ◄────────┘          │
//! │                                                              │
//! │  GET /  ─► {"status": "ok"}                                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod labels;
pub mod model;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::Config;
pub use error::{AppError, AppResult};
pub use labels::LabelList;
pub use model::{Classifier, Predictor};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
    pub config: Config,
}

impl AppState {
    pub fn new(predictor: Predictor, config: Config) -> Self {
        Self {
            predictor: Arc::new(predictor),
            config,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
