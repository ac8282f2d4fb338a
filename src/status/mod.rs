//! StatusExporter - Read-Only Worker Status
//!
//! Assembles a point-in-time status view from the registry's read
//! interface and the refresher's last-result flag. Never blocks on
//! scheduler or refresher activity, so a status read can never reflect
//! an in-progress partial registry update.

use crate::camera_registry::CameraRegistry;
use crate::registry_refresher::RegistryRefresher;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Point-in-time worker status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerStatus {
    pub camera_count: usize,
    pub enabled_camera_count: usize,
    pub last_refresh_succeeded: bool,
}

/// Read-only status source for external callers
pub struct StatusExporter {
    registry: Arc<CameraRegistry>,
    refresher: Arc<RegistryRefresher>,
}

impl StatusExporter {
    /// Create a new exporter
    pub fn new(registry: Arc<CameraRegistry>, refresher: Arc<RegistryRefresher>) -> Self {
        Self {
            registry,
            refresher,
        }
    }

    /// Current status snapshot
    pub async fn snapshot(&self) -> WorkerStatus {
        WorkerStatus {
            camera_count: self.registry.size().await,
            enabled_camera_count: self.registry.enabled_count().await,
            last_refresh_succeeded: self.refresher.last_refresh_ok(),
        }
    }
}
