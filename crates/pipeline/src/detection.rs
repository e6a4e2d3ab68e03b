//! The detection seam.
//!
//! The pipeline only ever asks a detector for the boxes of one frame and
//! counts them; box geometry is read by the annotator alone.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::encode::encode_jpeg;
use crate::error::DetectionError;
use crate::frame::Frame;

/// Boxes below this confidence are discarded by [`HttpDetector`] unless
/// configured otherwise.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.25;

/// One detected person, in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default = "full_confidence")]
    pub confidence: f32,
}

fn full_confidence() -> f32 {
    1.0
}

/// Everything detected in one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionResult {
    pub boxes: Vec<BoundingBox>,
}

impl DetectionResult {
    pub fn new(boxes: Vec<BoundingBox>) -> Self {
        Self { boxes }
    }

    /// Number of people detected.
    pub fn count(&self) -> usize {
        self.boxes.len()
    }
}

/// Maps a frame to the people visible in it.
///
/// Implementations must not depend on which frames they saw before; the
/// pipeline calls `detect` exactly once per frame, in clip order, and shares
/// one instance across concurrent requests.
#[async_trait]
pub trait Detector: Send + Sync {
    async fn detect(&self, frame: &Frame) -> Result<DetectionResult, DetectionError>;
}

/// Response body of the inference service.
#[derive(Debug, Deserialize)]
struct DetectResponse {
    boxes: Vec<BoundingBox>,
}

/// Detector backed by an HTTP inference service.
///
/// Each frame is POSTed as `image/jpeg`; the service answers with
/// `{"boxes": [{"x", "y", "width", "height", "confidence"}]}`.
#[derive(Debug, Clone)]
pub struct HttpDetector {
    client: reqwest::Client,
    url: String,
    confidence_threshold: f32,
}

impl HttpDetector {
    pub fn new(url: impl Into<String>, confidence_threshold: f32) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            confidence_threshold,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn filter(&self, boxes: Vec<BoundingBox>) -> DetectionResult {
        DetectionResult::new(
            boxes
                .into_iter()
                .filter(|b| b.confidence >= self.confidence_threshold)
                .collect(),
        )
    }
}

#[async_trait]
impl Detector for HttpDetector {
    async fn detect(&self, frame: &Frame) -> Result<DetectionResult, DetectionError> {
        let jpeg = encode_jpeg(frame.clone()).map_err(|e| DetectionError::Frame(e.to_string()))?;

        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "image/jpeg")
            .body(jpeg)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DetectionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: DetectResponse = response.json().await?;
        Ok(self.filter(parsed.boxes))
    }
}
