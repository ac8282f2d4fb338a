//! AlertDispatcher - Best-Effort Alert Delivery
//!
//! Serializes a detection event to the backend's alert endpoint. Any
//! 2xx acknowledgment is success; on failure the event is logged and
//! dropped. No retry queue, no buffering, no backpressure toward the
//! scheduler: losing an alert under transient backend unavailability is
//! accepted, at-most-once.

use crate::backend_client::BackendClient;
use crate::error::Result;
use crate::models::DetectionEvent;
use std::sync::Arc;

/// Best-effort dispatcher in front of the backend's alert endpoint
pub struct AlertDispatcher {
    backend: Arc<dyn BackendClient>,
}

impl AlertDispatcher {
    /// Create a new dispatcher
    pub fn new(backend: Arc<dyn BackendClient>) -> Self {
        Self { backend }
    }

    /// Deliver one event. Failures are logged and the event is dropped;
    /// the returned error exists for observability, not for retry.
    pub async fn dispatch(&self, event: &DetectionEvent) -> Result<()> {
        match self.backend.send_alert(event).await {
            Ok(()) => {
                tracing::info!(
                    camera_id = %event.camera_id,
                    face_count = event.face_count,
                    confidence = event.confidence,
                    "Alert delivered"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    camera_id = %event.camera_id,
                    error = %e,
                    "Alert delivery failed, event dropped"
                );
                Err(e)
            }
        }
    }
}
