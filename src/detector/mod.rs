//! Detector - Face Detection Capability
//!
//! ## Responsibilities
//!
//! - Evaluate one camera for faces this cycle
//! - Report confidence and face count on a positive finding
//!
//! The scheduler treats implementations as potentially slow or blocking
//! (a real pipeline is bound to a live stream read) and isolates each
//! call behind its own task and timeout; nothing here needs to care
//! about cadence. `SimulatedDetector` is the statistical stand-in used
//! when no vision pipeline is wired up.

use crate::camera_registry::Camera;
use crate::error::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;

/// A positive detection for one evaluation cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Confidence in [0.0, 1.0]
    pub confidence: f64,
    /// Number of faces found, always >= 1
    pub face_count: u32,
}

/// Face detection capability
#[async_trait]
pub trait Detector: Send + Sync {
    /// Evaluate one camera. `Ok(None)` means no faces this cycle.
    async fn evaluate(&self, camera: &Camera) -> Result<Option<Detection>>;
}

/// Statistical detector with an explicit, seedable randomness source
///
/// Detection odds depend on the stream locator: demo/test streams
/// trigger often, real RTSP URLs occasionally, unknown locators rarely.
/// Confidence is drawn uniformly from [0.5, 0.95], face count from 1-3.
pub struct SimulatedDetector {
    rng: Mutex<StdRng>,
}

impl SimulatedDetector {
    /// Create a detector seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Create a detector with a fixed seed for deterministic behavior
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn detection_chance(stream_url: &str) -> f64 {
        if stream_url == "test-camera" || stream_url == "demo-camera" {
            return 0.6;
        }
        if !stream_url.is_empty() && stream_url != "unknown" {
            return 0.3;
        }
        0.1
    }
}

#[async_trait]
impl Detector for SimulatedDetector {
    async fn evaluate(&self, camera: &Camera) -> Result<Option<Detection>> {
        let chance = Self::detection_chance(&camera.stream_url);
        let mut rng = self.rng.lock().await;

        if !rng.gen_bool(chance) {
            return Ok(None);
        }

        Ok(Some(Detection {
            confidence: rng.gen_range(0.5..=0.95),
            face_count: rng.gen_range(1..=3),
        }))
    }
}
