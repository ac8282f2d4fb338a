//! Skylark Worker
//!
//! Main entry point: wires the camera registry, roster refresher,
//! detection scheduler, and the health API together.

use skylark_worker::{
    alert_dispatcher::AlertDispatcher,
    backend_client::{BackendClient, HttpBackend},
    camera_registry::CameraRegistry,
    detection_scheduler::DetectionScheduler,
    detector::SimulatedDetector,
    registry_refresher::RegistryRefresher,
    state::{AppConfig, AppState},
    status::StatusExporter,
    web_api,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skylark_worker=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Skylark Worker v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::default();
    tracing::info!(
        backend_url = %config.backend_url,
        refresh_interval_sec = config.refresh_interval.as_secs(),
        tick_interval_sec = config.tick_interval.as_secs(),
        max_concurrent_evaluations = config.max_concurrent_evaluations,
        "Configuration loaded"
    );

    // Initialize components
    let backend: Arc<dyn BackendClient> = Arc::new(HttpBackend::new(config.backend_url.clone()));
    let registry = Arc::new(CameraRegistry::new());

    let refresher = Arc::new(RegistryRefresher::new(
        backend.clone(),
        registry.clone(),
        config.refresh_interval,
    ));

    let detector = Arc::new(SimulatedDetector::from_entropy());
    let dispatcher = Arc::new(AlertDispatcher::new(backend.clone()));

    let scheduler = Arc::new(DetectionScheduler::new(
        registry.clone(),
        detector,
        dispatcher,
        config.tick_interval,
        config.evaluation_timeout,
        config.max_concurrent_evaluations,
    ));

    // Initial fetch before the scheduler starts, so the first tick does
    // not run against an empty roster unnecessarily. A failure here is
    // not fatal; the refresh loop retries on its interval.
    if refresher.refresh_once().await.is_err() {
        tracing::warn!("Initial camera roster fetch failed, starting with empty roster");
    }

    refresher.start().await;
    scheduler.start().await;
    tracing::info!("Registry refresher and detection scheduler started");

    // Create application state and router
    let status = Arc::new(StatusExporter::new(registry.clone(), refresher.clone()));
    let state = AppState {
        config: config.clone(),
        registry,
        refresher,
        scheduler,
        status,
    };

    let app = web_api::create_router(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http());

    // Start server (the only fatal failure in this process)
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Health server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
