#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use rollcall_api::config::ServerConfig;
use rollcall_api::router::build_app_router;
use rollcall_api::state::AppState;
use rollcall_db::{AttendanceStore, MemoryAttendanceStore};
use rollcall_pipeline::ffmpeg::MediaTools;
use rollcall_pipeline::{
    BoundingBox, BoxOutlineAnnotator, DetectionError, DetectionResult, Detector, Frame, Pipeline,
};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 8 * 1024 * 1024,
        pipeline_depth: 2,
        database_url: None,
        detector_url: "http://127.0.0.1:9/detect".to_string(),
        detector_confidence: 0.25,
        ffmpeg_path: "ffmpeg".to_string(),
        ffprobe_path: "ffprobe".to_string(),
        scratch_dir: std::env::temp_dir(),
    }
}

/// Reports the same number of people on every frame.
pub struct FixedDetector(pub usize);

#[async_trait]
impl Detector for FixedDetector {
    async fn detect(&self, _frame: &Frame) -> Result<DetectionResult, DetectionError> {
        let boxes = (0..self.0)
            .map(|i| BoundingBox {
                x: i as f32 * 4.0,
                y: 1.0,
                width: 3.0,
                height: 3.0,
                confidence: 0.9,
            })
            .collect();
        Ok(DetectionResult::new(boxes))
    }
}

/// Always fails, like an unreachable inference service.
pub struct FailingDetector;

#[async_trait]
impl Detector for FailingDetector {
    async fn detect(&self, _frame: &Frame) -> Result<DetectionResult, DetectionError> {
        Err(DetectionError::Status {
            status: 503,
            body: "model not loaded".into(),
        })
    }
}

/// Build the full application router backed by the given store and detector.
///
/// Uses the same router builder as `main.rs` so integration tests exercise
/// the production middleware stack.
pub fn build_app_with(store: Arc<dyn AttendanceStore>, detector: Arc<dyn Detector>) -> Router {
    let config = test_config();
    let pipeline = Pipeline::new(
        detector,
        Arc::new(BoxOutlineAnnotator::default()),
        MediaTools::default(),
        config.pipeline_depth,
    );

    let state = AppState {
        store,
        pipeline: Arc::new(pipeline),
        config: Arc::new(config.clone()),
    };

    build_app_router(state, &config)
}

/// Router with an empty in-memory store and a detector that sees two people.
pub fn build_test_app() -> Router {
    build_app_with(Arc::new(MemoryAttendanceStore::new()), Arc::new(FixedDetector(2)))
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    post_raw(app, uri, serde_json::to_vec(&body).unwrap()).await
}

pub async fn post_raw(app: Router, uri: &str, body: Vec<u8>) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
