//! WebAPI - Read-Only Health/Status Endpoints
//!
//! ## Responsibilities
//!
//! - HTTP API routes
//! - Response formatting
//!
//! Everything here reads registry snapshots only; a response can never
//! reflect a partial roster update.

mod routes;

pub use routes::create_router;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

use crate::models::{HealthResponse, StatusResponse};
use crate::state::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        service: "skylark-worker".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        camera_count: state.registry.size().await,
        running: state.scheduler.is_running().await,
        timestamp: Utc::now().to_rfc3339(),
    };

    Json(response)
}

/// Status endpoint
pub async fn worker_status(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.status.snapshot().await;

    let response = StatusResponse {
        backend_url: state.config.backend_url.clone(),
        total_cameras: status.camera_count,
        active_cameras: status.enabled_camera_count,
        last_refresh_ok: status.last_refresh_succeeded,
        timestamp: Utc::now().to_rfc3339(),
    };

    Json(response)
}
