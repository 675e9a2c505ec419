use std::{sync::Arc, time::Duration};

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;

use crate::config::{AppConfig, SharedConfig};
use crate::middleware::{body_logging_middleware, LogSink, TracingSink};

#[derive(Clone)]
pub struct AppState {
    pub config: SharedConfig,
    pub sink: Arc<dyn LogSink>,
}

impl AppState {
    pub fn new(config: SharedConfig, sink: Arc<dyn LogSink>) -> Self {
        Self { config, sink }
    }

    /// State logging through `tracing`.
    pub fn with_tracing(config: SharedConfig) -> Self {
        Self::new(config, Arc::new(TracingSink))
    }
}

pub fn create_app(state: AppState, current_config: &AppConfig) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/v1/health", get(routes::health::health_detailed))
        .route("/api/v1/echo", post(routes::echo::echo))
        .route("/api/v1/items", get(routes::items::list_items))
        .layer(from_fn_with_state(state.clone(), body_logging_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    current_config.server.timeout_seconds,
                ))),
        )
        .with_state(state)
}
