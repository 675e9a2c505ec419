use std::net::SocketAddr;

use anyhow::Result;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use body_capture_gateway::{
    config::{watcher::ConfigWatcher, AppConfig, MetricsConfig},
    create_app,
    metrics::RESPONSE_CAPTURED_BYTES,
    AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing()?;

    let config_path = AppConfig::config_path();
    let initial_config = AppConfig::load_from(&config_path)?;
    info!("Initial configuration loaded successfully");

    init_metrics(&initial_config.metrics)?;

    let shared = initial_config.clone().into_shared();
    let config_watcher = match ConfigWatcher::new(&config_path, shared.clone()) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            info!("Hot reload disabled for {}: {}", config_path, e);
            None
        }
    };

    if let Some(watcher) = &config_watcher {
        let mut reload_rx = watcher.subscribe_to_reloads();
        tokio::spawn(async move {
            while let Ok(new_config) = reload_rx.recv().await {
                info!(
                    enabled = new_config.logging.enabled,
                    include_request_body = new_config.logging.include_request_body,
                    include_response_body = new_config.logging.include_response_body,
                    "Body logging settings reloaded; applied from the next request"
                );
            }
        });
    }

    let state = AppState::with_tracing(shared);
    let app = create_app(state, &initial_config);

    let addr = format!("{}:{}", initial_config.server.host, initial_config.server.port);
    let listener = TcpListener::bind(&addr).await?;

    info!("Body capture gateway starting on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

/// `LOG_FORMAT=json` (the default) emits one JSON object per event, anything
/// else the human readable format. `RUST_LOG` filters, falling back to `info`.
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").map_or(true, |format| format.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().flatten_event(true)).try_init()?;
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()?;
    }

    Ok(())
}

const CAPTURED_BYTES_BUCKETS: &[f64] = &[
    64.0, 256.0, 1024.0, 4096.0, 16384.0, 65536.0, 262144.0, 1048576.0,
];

fn init_metrics(config: &MetricsConfig) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Full(RESPONSE_CAPTURED_BYTES.to_string()),
            CAPTURED_BYTES_BUCKETS,
        )?
        .install()?;

    info!(%addr, "Prometheus exporter listening");
    Ok(())
}
