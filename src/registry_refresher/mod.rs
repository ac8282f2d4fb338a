//! RegistryRefresher - Periodic Roster Sync
//!
//! ## Responsibilities
//!
//! - Fetch the camera list from the backend once at startup
//! - Re-fetch on a fixed interval and atomically swap the registry
//! - Keep the previous roster on any fetch failure
//!
//! A failed fetch is never fatal and never partially applies: the
//! policy is retry-by-next-tick, not immediate retry. An empty camera
//! list from the backend is a valid result and empties the registry,
//! distinct from a fetch failure.

use crate::backend_client::BackendClient;
use crate::camera_registry::CameraRegistry;
use crate::error::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::interval;

/// Periodic roster sync; the registry's sole writer
pub struct RegistryRefresher {
    backend: Arc<dyn BackendClient>,
    registry: Arc<CameraRegistry>,
    refresh_interval: Duration,
    last_refresh_ok: Arc<AtomicBool>,
    running: Arc<RwLock<bool>>,
}

impl RegistryRefresher {
    /// Create a new refresher
    pub fn new(
        backend: Arc<dyn BackendClient>,
        registry: Arc<CameraRegistry>,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            backend,
            registry,
            refresh_interval,
            last_refresh_ok: Arc::new(AtomicBool::new(false)),
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Whether the most recent fetch succeeded
    pub fn last_refresh_ok(&self) -> bool {
        self.last_refresh_ok.load(Ordering::Relaxed)
    }

    /// Fetch the roster once and swap it into the registry.
    /// On failure the existing registry is left untouched.
    pub async fn refresh_once(&self) -> Result<()> {
        Self::fetch_and_swap(&self.backend, &self.registry, &self.last_refresh_ok).await
    }

    async fn fetch_and_swap(
        backend: &Arc<dyn BackendClient>,
        registry: &CameraRegistry,
        last_refresh_ok: &AtomicBool,
    ) -> Result<()> {
        match backend.fetch_cameras().await {
            Ok(cameras) => {
                let total = cameras.len();
                let enabled = cameras.iter().filter(|c| c.enabled).count();
                registry.replace(cameras).await;
                last_refresh_ok.store(true, Ordering::Relaxed);
                tracing::info!(total = total, enabled = enabled, "Camera roster refreshed");
                Ok(())
            }
            Err(e) => {
                last_refresh_ok.store(false, Ordering::Relaxed);
                tracing::warn!(
                    error = %e,
                    "Camera roster fetch failed, keeping previous roster"
                );
                Err(e)
            }
        }
    }

    /// Start the refresh loop
    pub async fn start(&self) {
        {
            let mut running = self.running.write().await;
            if *running {
                tracing::warn!("Registry refresher already running");
                return;
            }
            *running = true;
        }

        tracing::info!(
            interval_sec = self.refresh_interval.as_secs(),
            "Starting registry refresher"
        );

        let backend = self.backend.clone();
        let registry = self.registry.clone();
        let last_refresh_ok = self.last_refresh_ok.clone();
        let running = self.running.clone();
        let refresh_interval = self.refresh_interval;

        tokio::spawn(async move {
            let mut ticker = interval(refresh_interval);
            // The first tick completes immediately; the startup fetch
            // already ran before the loops were started, so consume it.
            ticker.tick().await;

            loop {
                ticker.tick().await;

                {
                    let is_running = running.read().await;
                    if !*is_running {
                        break;
                    }
                }

                // Failures were already logged; next attempt is the next tick
                let _ = Self::fetch_and_swap(&backend, &registry, &last_refresh_ok).await;
            }

            tracing::info!("Registry refresher stopped");
        });
    }

    /// Stop the refresh loop
    pub async fn stop(&self) {
        let mut running = self.running.write().await;
        *running = false;
        tracing::info!("Stopping registry refresher");
    }
}
