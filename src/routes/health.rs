use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::AppState;

pub const SERVICE_NAME: &str = "body-capture-gateway";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
    pub server_config: ServerConfigInfo,
    pub body_logging: BodyLoggingInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerConfigInfo {
    pub host: String,
    pub port: u16,
    pub timeout_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BodyLoggingInfo {
    pub enabled: bool,
    pub include_request_body: bool,
    pub include_response_body: bool,
    pub max_body_bytes: usize,
}

/// Basic health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Detailed health check endpoint
///
/// Reports the configuration currently in effect, including hot-reloaded
/// body logging settings.
pub async fn health_detailed(State(state): State<AppState>) -> Json<DetailedHealthResponse> {
    info!("Detailed health check requested");

    let config = state.config.read().await.clone();

    Json(DetailedHealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        server_config: ServerConfigInfo {
            host: config.server.host,
            port: config.server.port,
            timeout_seconds: config.server.timeout_seconds,
        },
        body_logging: BodyLoggingInfo {
            enabled: config.logging.enabled,
            include_request_body: config.logging.include_request_body,
            include_response_body: config.logging.include_response_body,
            max_body_bytes: config.logging.max_body_bytes,
        },
    })
}
