//! Skylark Worker Library
//!
//! Background worker that keeps a live roster of camera sources,
//! evaluates each one for face detections on a fixed cadence, and
//! reports qualifying events to the backend.
//!
//! ## Architecture (7 Components)
//!
//! 1. CameraRegistry - shared camera roster with atomic snapshot swap
//! 2. BackendClient - HTTP adapter for camera fetch and alert delivery
//! 3. RegistryRefresher - periodic roster sync from the backend
//! 4. Detector - face detection capability (simulated or real pipeline)
//! 5. DetectionScheduler - per-tick concurrent camera evaluation
//! 6. AlertDispatcher - best-effort alert delivery (no retry, no queue)
//! 7. WebAPI - read-only health/status endpoints
//!
//! ## Design Principles
//!
//! - CameraRegistry is the single source of truth for the roster;
//!   RegistryRefresher is its only writer
//! - Evaluation, refresh, and dispatch are isolated so a stall in one
//!   never delays the tick that drives the others

pub mod alert_dispatcher;
pub mod backend_client;
pub mod camera_registry;
pub mod detection_scheduler;
pub mod detector;
pub mod error;
pub mod models;
pub mod registry_refresher;
pub mod state;
pub mod status;
pub mod web_api;

pub use error::{Error, Result};
pub use state::AppState;
