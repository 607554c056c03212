use axum::ServiceExt;
use axum::extract::Request;
use std::sync::Arc;
use std::time::Instant;
use tabquery::api::{self, app_state::AppState};
use tabquery::config::loader::ConfigLoader;
use tabquery::observability::{HealthCheckResult, ObservabilityState, init_tracing};
use tabquery::storage::factory::StorageFactory;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::load()?;
    ConfigLoader::validate(&config)?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_tracing(&config.logging);
    info!(
        "Starting {} ({} environment)...",
        config.app_name, config.environment
    );

    let storage = StorageFactory::create(&config.database).await?;
    info!("Storage initialized: {:?}", config.database.backend);

    let app_state = AppState::from_config(&config, &storage).await?;
    info!(
        "Application state created with {} stored records",
        app_state.record_store.len()
    );

    let observability_state = Arc::new(ObservabilityState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        app_state.metrics.clone(),
    ));

    let started = Instant::now();
    let storage_result = storage.health_check().await;
    if let Err(e) = &storage_result {
        warn!("Storage health check failed: {}", e);
    }
    observability_state
        .add_health_check(HealthCheckResult {
            name: "storage".to_string(),
            healthy: storage_result.unwrap_or(false),
            message: format!("{:?} backend", config.database.backend),
            latency_ms: started.elapsed().as_millis() as u64,
        })
        .await;

    let router = api::create_app(app_state, observability_state);
    let app = NormalizePathLayer::trim_trailing_slash().layer(router);
    info!("API router created with observability endpoints");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;

    Ok(())
}
