//! Application state
//!
//! Holds configuration and the shared components handed to the API
//! layer. Components are explicit handles passed at construction, not
//! ambient globals, so tests can run multiple independent instances.

use crate::camera_registry::CameraRegistry;
use crate::detection_scheduler::DetectionScheduler;
use crate::registry_refresher::RegistryRefresher;
use crate::status::StatusExporter;
use std::sync::Arc;
use std::time::Duration;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_secs_or(key: &str, default: u64) -> Duration {
    let secs = std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default);
    Duration::from_secs(secs)
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Backend base URL
    pub backend_url: String,
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Camera roster refresh interval
    pub refresh_interval: Duration,
    /// Detection tick interval
    pub tick_interval: Duration,
    /// Per-evaluation deadline
    pub evaluation_timeout: Duration,
    /// Detector calls allowed in flight at once
    pub max_concurrent_evaluations: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: env_or("BACKEND_URL", "http://localhost:3001"),
            host: env_or("HOST", "0.0.0.0"),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            refresh_interval: env_secs_or("REFRESH_INTERVAL_SEC", 30),
            tick_interval: env_secs_or("TICK_INTERVAL_SEC", 3),
            evaluation_timeout: env_secs_or("EVALUATION_TIMEOUT_SEC", 10),
            max_concurrent_evaluations: std::env::var("MAX_CONCURRENT_EVALUATIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8),
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub registry: Arc<CameraRegistry>,
    pub refresher: Arc<RegistryRefresher>,
    pub scheduler: Arc<DetectionScheduler>,
    pub status: Arc<StatusExporter>,
}
