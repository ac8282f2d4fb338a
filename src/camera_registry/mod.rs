//! CameraRegistry - Shared Camera Roster
//!
//! ## Responsibilities
//!
//! - Hold the current set of known cameras
//! - Atomic wholesale replace (RegistryRefresher is the sole writer)
//! - Point-in-time read snapshots for the scheduler and status API
//!
//! The roster lives behind a single swappable `Arc`: `replace` builds a
//! new map and swaps the reference, `snapshot` clones the reference.
//! Readers always observe either the pre-refresh or post-refresh state,
//! never a partially-updated mix, and a snapshot stays stable even if a
//! replace lands immediately after it was taken.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Camera entity as fetched from the backend
///
/// Immutable within one refresh cycle; each refresh produces an
/// entirely new set of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub id: String,
    pub name: String,
    #[serde(rename = "rtspUrl")]
    pub stream_url: String,
    #[serde(rename = "isEnabled")]
    pub enabled: bool,
    pub location: String,
}

/// Shared camera roster, replaced wholesale on each successful refresh
pub struct CameraRegistry {
    // Lock guards only the reference, never the elements
    cameras: RwLock<Arc<HashMap<String, Camera>>>,
}

impl CameraRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            cameras: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    /// Atomically install a new complete camera set, discarding the
    /// previous one. Safe under any number of concurrent readers.
    pub async fn replace(&self, cameras: Vec<Camera>) {
        let map: HashMap<String, Camera> =
            cameras.into_iter().map(|c| (c.id.clone(), c)).collect();
        let mut current = self.cameras.write().await;
        *current = Arc::new(map);
    }

    /// Get the camera set as observed at call time
    pub async fn snapshot(&self) -> Arc<HashMap<String, Camera>> {
        Arc::clone(&*self.cameras.read().await)
    }

    /// Count of cameras in the current roster
    pub async fn size(&self) -> usize {
        self.cameras.read().await.len()
    }

    /// Count of enabled cameras in the current roster
    pub async fn enabled_count(&self) -> usize {
        self.cameras
            .read()
            .await
            .values()
            .filter(|c| c.enabled)
            .count()
    }
}

impl Default for CameraRegistry {
    fn default() -> Self {
        Self::new()
    }
}
