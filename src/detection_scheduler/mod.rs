//! DetectionScheduler - Per-Tick Concurrent Camera Evaluation
//!
//! ## Responsibilities
//!
//! - Take a registry snapshot on each fixed tick
//! - Launch one concurrent evaluation per enabled camera
//! - Route positive detections to the AlertDispatcher
//!
//! Evaluations are fully independent: a slow or failing camera never
//! delays the others or the next tick. The tick fires whether or not
//! the previous cycle's work has finished; overlapping cycles only
//! share the read-only snapshot and the dispatcher. A semaphore sized
//! independently of fleet size bounds how many detector calls run at
//! once, and each call runs under its own timeout so one stalled stream
//! cannot pin a worker slot forever.
//!
//! If the snapshot is empty at tick time, exactly one synthetic demo
//! camera is evaluated instead, so the pipeline stays observably alive
//! with no configured cameras. A fallback policy, not an error.

use crate::alert_dispatcher::AlertDispatcher;
use crate::camera_registry::{Camera, CameraRegistry};
use crate::detector::Detector;
use crate::error::Error;
use crate::models::DetectionEvent;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout};

/// Orchestrates the evaluation round that runs on every tick
pub struct DetectionScheduler {
    registry: Arc<CameraRegistry>,
    detector: Arc<dyn Detector>,
    dispatcher: Arc<AlertDispatcher>,
    tick_interval: Duration,
    evaluation_timeout: Duration,
    eval_slots: Arc<Semaphore>,
    running: Arc<RwLock<bool>>,
}

impl DetectionScheduler {
    /// Create a new scheduler
    pub fn new(
        registry: Arc<CameraRegistry>,
        detector: Arc<dyn Detector>,
        dispatcher: Arc<AlertDispatcher>,
        tick_interval: Duration,
        evaluation_timeout: Duration,
        max_concurrent_evaluations: usize,
    ) -> Self {
        Self {
            registry,
            detector,
            dispatcher,
            tick_interval,
            evaluation_timeout,
            eval_slots: Arc::new(Semaphore::new(max_concurrent_evaluations)),
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Whether the tick loop is running
    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Start the tick loop
    pub async fn start(&self) {
        {
            let mut running = self.running.write().await;
            if *running {
                tracing::warn!("Detection scheduler already running");
                return;
            }
            *running = true;
        }

        tracing::info!(
            tick_sec = self.tick_interval.as_secs(),
            eval_timeout_sec = self.evaluation_timeout.as_secs(),
            "Starting detection scheduler"
        );

        let registry = self.registry.clone();
        let detector = self.detector.clone();
        let dispatcher = self.dispatcher.clone();
        let eval_slots = self.eval_slots.clone();
        let evaluation_timeout = self.evaluation_timeout;
        let running = self.running.clone();
        let tick_interval = self.tick_interval;

        tokio::spawn(async move {
            let mut ticker = interval(tick_interval);

            loop {
                ticker.tick().await;

                {
                    let is_running = running.read().await;
                    if !*is_running {
                        break;
                    }
                }

                // Handles are dropped: the tick never waits for the
                // evaluations it launched.
                let _handles = Self::launch_evaluations(
                    &registry,
                    &detector,
                    &dispatcher,
                    &eval_slots,
                    evaluation_timeout,
                )
                .await;
            }

            tracing::info!("Detection scheduler stopped");
        });
    }

    /// Stop the tick loop
    pub async fn stop(&self) {
        let mut running = self.running.write().await;
        *running = false;
        tracing::info!("Stopping detection scheduler");
    }

    /// Run one evaluation round: snapshot the registry and launch one
    /// task per enabled camera. Returns the spawned handles so callers
    /// that need completion (tests) can await them; the tick loop
    /// drops them.
    pub async fn run_tick(&self) -> Vec<JoinHandle<()>> {
        Self::launch_evaluations(
            &self.registry,
            &self.detector,
            &self.dispatcher,
            &self.eval_slots,
            self.evaluation_timeout,
        )
        .await
    }

    async fn launch_evaluations(
        registry: &CameraRegistry,
        detector: &Arc<dyn Detector>,
        dispatcher: &Arc<AlertDispatcher>,
        eval_slots: &Arc<Semaphore>,
        evaluation_timeout: Duration,
    ) -> Vec<JoinHandle<()>> {
        let snapshot = registry.snapshot().await;

        let cameras: Vec<Camera> = if snapshot.is_empty() {
            vec![Self::fallback_camera()]
        } else {
            snapshot.values().filter(|c| c.enabled).cloned().collect()
        };

        tracing::debug!(evaluations = cameras.len(), "Tick: launching evaluations");

        cameras
            .into_iter()
            .map(|camera| {
                let detector = Arc::clone(detector);
                let dispatcher = Arc::clone(dispatcher);
                let slots = Arc::clone(eval_slots);

                tokio::spawn(async move {
                    Self::evaluate_camera(camera, detector, dispatcher, slots, evaluation_timeout)
                        .await;
                })
            })
            .collect()
    }

    /// Synthetic camera substituted when the roster is empty
    fn fallback_camera() -> Camera {
        Camera {
            id: "demo-camera".to_string(),
            name: "Demo Camera".to_string(),
            stream_url: "demo-camera".to_string(),
            enabled: true,
            location: "Simulated Location".to_string(),
        }
    }

    /// Evaluate one camera and dispatch on a positive finding.
    /// Detection completes (or is abandoned) before its alert is sent;
    /// that causal order holds per camera only.
    async fn evaluate_camera(
        camera: Camera,
        detector: Arc<dyn Detector>,
        dispatcher: Arc<AlertDispatcher>,
        slots: Arc<Semaphore>,
        eval_timeout: Duration,
    ) {
        let _permit = match slots.acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return, // semaphore closed, shutting down
        };

        let result = match timeout(eval_timeout, detector.evaluate(&camera)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Evaluation(format!(
                "timed out after {}s",
                eval_timeout.as_secs()
            ))),
        };

        match result {
            Ok(Some(detection)) => {
                tracing::info!(
                    camera_id = %camera.id,
                    name = %camera.name,
                    location = %camera.location,
                    face_count = detection.face_count,
                    confidence = detection.confidence,
                    "Face detected"
                );

                let event = DetectionEvent {
                    camera_id: camera.id.clone(),
                    confidence: detection.confidence,
                    face_count: detection.face_count,
                    timestamp: Utc::now(),
                };

                // Best effort: failure was logged by the dispatcher
                let _ = dispatcher.dispatch(&event).await;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    camera_id = %camera.id,
                    error = %e,
                    "Camera evaluation failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend_client::BackendClient;
    use crate::detector::Detection;
    use crate::error::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    /// Detector that records which cameras it saw
    struct RecordingDetector {
        evaluated: Mutex<Vec<String>>,
        detect: bool,
        delay: Option<Duration>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl RecordingDetector {
        fn new(detect: bool) -> Self {
            Self {
                evaluated: Mutex::new(Vec::new()),
                detect,
                delay: None,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        fn with_delay(detect: bool, delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::new(detect)
            }
        }
    }

    #[async_trait]
    impl Detector for RecordingDetector {
        async fn evaluate(&self, camera: &Camera) -> Result<Option<Detection>> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);

            self.evaluated.lock().await.push(camera.id.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.detect {
                Ok(Some(Detection {
                    confidence: 0.9,
                    face_count: 1,
                }))
            } else {
                Ok(None)
            }
        }
    }

    /// Backend that counts delivered alerts
    struct CountingBackend {
        alerts: Mutex<Vec<DetectionEvent>>,
        fail: bool,
    }

    impl CountingBackend {
        fn new(fail: bool) -> Self {
            Self {
                alerts: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait]
    impl BackendClient for CountingBackend {
        async fn fetch_cameras(&self) -> Result<Vec<Camera>> {
            Ok(Vec::new())
        }

        async fn send_alert(&self, event: &DetectionEvent) -> Result<()> {
            if self.fail {
                return Err(Error::Dispatch("backend returned status 500".to_string()));
            }
            self.alerts.lock().await.push(event.clone());
            Ok(())
        }
    }

    fn camera(id: &str, enabled: bool) -> Camera {
        Camera {
            id: id.to_string(),
            name: format!("Camera {}", id),
            stream_url: format!("rtsp://host/{}", id),
            enabled,
            location: "Lobby".to_string(),
        }
    }

    struct Harness {
        scheduler: Arc<DetectionScheduler>,
        registry: Arc<CameraRegistry>,
        detector: Arc<RecordingDetector>,
        backend: Arc<CountingBackend>,
    }

    fn harness(detector: RecordingDetector, backend: CountingBackend, slots: usize) -> Harness {
        let registry = Arc::new(CameraRegistry::new());
        let detector = Arc::new(detector);
        let backend = Arc::new(backend);
        let dispatcher = Arc::new(AlertDispatcher::new(backend.clone()));
        let scheduler = Arc::new(DetectionScheduler::new(
            registry.clone(),
            detector.clone(),
            dispatcher,
            Duration::from_secs(3),
            Duration::from_secs(5),
            slots,
        ));
        Harness {
            scheduler,
            registry,
            detector,
            backend,
        }
    }

    async fn join_all(handles: Vec<JoinHandle<()>>) {
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_disabled_cameras_never_reach_detector() {
        let h = harness(RecordingDetector::new(false), CountingBackend::new(false), 8);
        h.registry
            .replace(vec![
                camera("on1", true),
                camera("off1", false),
                camera("on2", true),
                camera("off2", false),
            ])
            .await;

        join_all(h.scheduler.run_tick().await).await;

        let mut evaluated = h.detector.evaluated.lock().await.clone();
        evaluated.sort();
        assert_eq!(evaluated, vec!["on1", "on2"]);
    }

    #[tokio::test]
    async fn test_empty_roster_evaluates_exactly_one_fallback() {
        let h = harness(RecordingDetector::new(false), CountingBackend::new(false), 8);

        join_all(h.scheduler.run_tick().await).await;

        let evaluated = h.detector.evaluated.lock().await.clone();
        assert_eq!(evaluated, vec!["demo-camera"]);
    }

    #[tokio::test]
    async fn test_positive_detection_dispatches_alert() {
        let h = harness(RecordingDetector::new(true), CountingBackend::new(false), 8);
        h.registry.replace(vec![camera("c1", true)]).await;

        join_all(h.scheduler.run_tick().await).await;

        let alerts = h.backend.alerts.lock().await;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].camera_id, "c1");
        assert_eq!(alerts[0].face_count, 1);
    }

    #[tokio::test]
    async fn test_dispatch_failure_does_not_block_next_tick() {
        let h = harness(RecordingDetector::new(true), CountingBackend::new(true), 8);
        h.registry.replace(vec![camera("c1", true)]).await;
        let before = h.registry.snapshot().await;

        join_all(h.scheduler.run_tick().await).await;
        join_all(h.scheduler.run_tick().await).await;

        // Both ticks ran despite every dispatch failing, roster untouched
        assert_eq!(h.detector.evaluated.lock().await.len(), 2);
        assert_eq!(*before, *h.registry.snapshot().await);
    }

    #[tokio::test]
    async fn test_overlapping_ticks_dispatch_everything() {
        let h = harness(
            RecordingDetector::with_delay(true, Duration::from_millis(100)),
            CountingBackend::new(false),
            8,
        );
        h.registry
            .replace(vec![camera("c1", true), camera("c2", true)])
            .await;

        // Second tick fires while the first tick's evaluations sleep
        let first = h.scheduler.run_tick().await;
        let second = h.scheduler.run_tick().await;
        join_all(first).await;
        join_all(second).await;

        assert_eq!(h.backend.alerts.lock().await.len(), 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_bounded_by_semaphore() {
        let h = harness(
            RecordingDetector::with_delay(false, Duration::from_millis(30)),
            CountingBackend::new(false),
            2,
        );
        let fleet: Vec<Camera> = (0..8).map(|i| camera(&format!("c{}", i), true)).collect();
        h.registry.replace(fleet).await;

        join_all(h.scheduler.run_tick().await).await;

        assert_eq!(h.detector.evaluated.lock().await.len(), 8);
        assert!(h.detector.max_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_stalled_evaluation_is_timed_out_and_isolated() {
        // Far beyond the 50ms evaluation timeout used below
        let h = {
            let registry = Arc::new(CameraRegistry::new());
            let detector = Arc::new(RecordingDetector::with_delay(
                true,
                Duration::from_secs(30),
            ));
            let backend = Arc::new(CountingBackend::new(false));
            let dispatcher = Arc::new(AlertDispatcher::new(backend.clone()));
            let scheduler = Arc::new(DetectionScheduler::new(
                registry.clone(),
                detector.clone(),
                dispatcher,
                Duration::from_secs(3),
                Duration::from_millis(50),
                8,
            ));
            Harness {
                scheduler,
                registry,
                detector,
                backend,
            }
        };
        h.registry.replace(vec![camera("stalled", true)]).await;

        join_all(h.scheduler.run_tick().await).await;

        // Abandoned evaluation never produced an alert
        assert!(h.backend.alerts.lock().await.is_empty());
    }
}
