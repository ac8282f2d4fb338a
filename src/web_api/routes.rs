//! API Routes

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use std::collections::HashMap;

use crate::camera_registry::Camera;
use crate::error::{Error, Result};
use crate::state::AppState;

/// Create API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(super::health_check))
        .route("/status", get(super::worker_status))
        .route("/cameras", get(list_cameras))
        .route("/cameras/:id", get(get_camera))
        .with_state(state)
}

/// Current roster as a JSON map keyed by camera ID
async fn list_cameras(State(state): State<AppState>) -> Json<HashMap<String, Camera>> {
    let snapshot = state.registry.snapshot().await;
    Json(snapshot.as_ref().clone())
}

/// Single camera lookup
async fn get_camera(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Camera>> {
    let snapshot = state.registry.snapshot().await;
    snapshot
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Error::NotFound(format!("camera {}", id)))
}
