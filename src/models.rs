//! Shared models and types for the Skylark worker
//!
//! This module contains types shared across multiple modules
//! to avoid circular dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A positive finding from one camera evaluation, pending delivery to
/// the backend. Transient: serialized, sent, then discarded. Duplicates
/// are not deduplicated here; idempotence is the backend's concern.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionEvent {
    pub camera_id: String,
    /// Confidence in [0.0, 1.0]
    pub confidence: f64,
    /// Number of faces found, always >= 1
    pub face_count: u32,
    /// Evaluation time, serialized as RFC3339
    pub timestamp: DateTime<Utc>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub camera_count: usize,
    pub running: bool,
    pub timestamp: String,
}

/// Status endpoint response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub backend_url: String,
    pub total_cameras: usize,
    pub active_cameras: usize,
    pub last_refresh_ok: bool,
    pub timestamp: String,
}
