//! Media pipeline: decode an uploaded image or clip, count people frame by
//! frame, draw the detections, and re-encode.
//!
//! Decoding and encoding of video go through `ffmpeg`/`ffprobe` child
//! processes; still images through the `image` crate. The detector and the
//! annotator are injected trait objects so the frame loop can be driven by
//! stubs in tests.

pub mod aggregate;
pub mod annotate;
pub mod decode;
pub mod detection;
pub mod encode;
pub mod error;
pub mod ffmpeg;
pub mod frame;
pub mod job;

pub use aggregate::{representative_count, VideoJob, VideoTally};
pub use annotate::{Annotator, BoxOutlineAnnotator};
pub use detection::{BoundingBox, DetectionResult, Detector, HttpDetector};
pub use error::{DetectionError, PipelineError};
pub use ffmpeg::MediaTools;
pub use frame::{ChannelOrder, Frame, MediaKind, VideoMeta};
pub use job::{ImageOutcome, Pipeline, ProcessedMedia, VideoOutcome, DEFAULT_PIPELINE_DEPTH};
