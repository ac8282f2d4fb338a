//! BackendClient - Backend Communication Adapter
//!
//! ## Responsibilities
//!
//! - Fetch the camera roster (`GET /api/cameras`)
//! - Deliver detection alerts (`POST /api/alerts`)
//!
//! The trait is the seam the core depends on; `HttpBackend` is the
//! production implementation. Errors are classified at the call site
//! into the roster-fetch and dispatch taxonomy rather than bubbling raw
//! transport errors upward.

use crate::camera_registry::Camera;
use crate::error::{Error, Result};
use crate::models::DetectionEvent;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

/// Backend capability the worker core depends on
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Fetch the current camera list from the backend
    async fn fetch_cameras(&self) -> Result<Vec<Camera>>;

    /// Submit one detection alert. 2xx acknowledgment is success;
    /// anything else is a dispatch failure and the event is dropped by
    /// the caller.
    async fn send_alert(&self, event: &DetectionEvent) -> Result<()>;
}

/// HTTP implementation of [`BackendClient`]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a new backend client
    pub fn new(base_url: String) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(10))
    }

    /// Create a new backend client with a custom request timeout
    pub fn with_timeout(base_url: String, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to build HTTP client");

        Self { http, base_url }
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl BackendClient for HttpBackend {
    async fn fetch_cameras(&self) -> Result<Vec<Camera>> {
        let url = format!("{}/api/cameras", self.base_url);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::RegistryFetch(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Error::RegistryFetch(format!(
                "backend returned status {}",
                resp.status()
            )));
        }

        let cameras: Vec<Camera> = resp
            .json()
            .await
            .map_err(|e| Error::RegistryFetch(format!("malformed camera list: {}", e)))?;

        Ok(cameras)
    }

    async fn send_alert(&self, event: &DetectionEvent) -> Result<()> {
        let url = format!("{}/api/alerts", self.base_url);
        let body = serde_json::to_vec(event)?;

        let resp = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Dispatch(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Error::Dispatch(format!(
                "backend returned status {}",
                resp.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use chrono::Utc;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    type Captured = Arc<Mutex<Option<serde_json::Value>>>;

    /// Spin up a throwaway backend on an ephemeral port. Returns its
    /// base URL and the captured alert body, if any arrives.
    async fn spawn_backend(cameras_body: &'static str, alert_status: u16) -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(None));
        let captured_clone = captured.clone();

        let app = Router::new()
            .route("/api/cameras", get(move || async move { cameras_body }))
            .route(
                "/api/alerts",
                post(
                    move |State(cap): State<Captured>, Json(body): Json<serde_json::Value>| async move {
                        *cap.lock().await = Some(body);
                        axum::http::StatusCode::from_u16(alert_status).unwrap()
                    },
                ),
            )
            .with_state(captured_clone);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), captured)
    }

    fn event() -> DetectionEvent {
        DetectionEvent {
            camera_id: "cam1".to_string(),
            confidence: 0.95,
            face_count: 2,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_fetch_cameras_parses_wire_fields() {
        let body = r#"[{"id":"cam1","name":"Front","rtspUrl":"rtsp://h/1","isEnabled":true,"location":"Entrance"},
                       {"id":"cam2","name":"Back","rtspUrl":"rtsp://h/2","isEnabled":false,"location":"Yard"}]"#;
        let (base, _) = spawn_backend(body, 201).await;

        let backend = HttpBackend::with_timeout(base, Duration::from_secs(2));
        let cameras = backend.fetch_cameras().await.unwrap();

        assert_eq!(cameras.len(), 2);
        assert_eq!(cameras[0].id, "cam1");
        assert!(cameras[0].enabled);
        assert!(!cameras[1].enabled);
    }

    #[tokio::test]
    async fn test_fetch_cameras_malformed_body_is_fetch_error() {
        let (base, _) = spawn_backend(r#"{"not":"an array"}"#, 201).await;

        let backend = HttpBackend::with_timeout(base, Duration::from_secs(2));
        let err = backend.fetch_cameras().await.unwrap_err();
        assert!(matches!(err, Error::RegistryFetch(_)));
    }

    #[tokio::test]
    async fn test_fetch_cameras_unreachable_backend_is_fetch_error() {
        // Nothing listens on this port
        let backend =
            HttpBackend::with_timeout("http://127.0.0.1:1".to_string(), Duration::from_secs(1));
        let err = backend.fetch_cameras().await.unwrap_err();
        assert!(matches!(err, Error::RegistryFetch(_)));
    }

    #[tokio::test]
    async fn test_send_alert_posts_exact_wire_body() {
        let (base, captured) = spawn_backend("[]", 201).await;

        let backend = HttpBackend::with_timeout(base, Duration::from_secs(2));
        backend.send_alert(&event()).await.unwrap();

        let body = captured.lock().await.clone().expect("alert body captured");
        assert_eq!(body["cameraId"], "cam1");
        assert_eq!(body["confidence"], 0.95);
        assert_eq!(body["faceCount"], 2);
        // RFC3339 timestamp present and parseable
        let ts = body["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[tokio::test]
    async fn test_send_alert_non_2xx_is_dispatch_error() {
        let (base, _) = spawn_backend("[]", 500).await;

        let backend = HttpBackend::with_timeout(base, Duration::from_secs(2));
        let err = backend.send_alert(&event()).await.unwrap_err();
        assert!(matches!(err, Error::Dispatch(_)));
    }
}
