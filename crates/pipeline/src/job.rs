//! Job orchestration: one image or one clip per call.
//!
//! Frames are processed strictly in clip order, each detected exactly once.
//! Decoding runs one stage ahead on its own task, bounded by the channel
//! depth, so decoding frame *i+1* overlaps detection of frame *i* without any
//! observable reordering.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::aggregate::{VideoJob, VideoTally};
use crate::annotate::{annotate_frame, Annotator};
use crate::decode::{decode_image, FrameSource, VideoSource};
use crate::detection::{DetectionResult, Detector};
use crate::encode::{encode_jpeg, FrameSink, VideoSink};
use crate::error::PipelineError;
use crate::ffmpeg::MediaTools;
use crate::frame::{Frame, MediaKind, VideoMeta};

/// Default number of decoded frames allowed to wait for detection.
pub const DEFAULT_PIPELINE_DEPTH: usize = 4;

/// Result of an image job.
#[derive(Debug, Clone)]
pub struct ImageOutcome {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub num_students: u64,
}

/// Result of a video job.
#[derive(Debug, Clone)]
pub struct VideoOutcome {
    pub mp4: Vec<u8>,
    pub meta: VideoMeta,
    pub tally: VideoTally,
}

/// Annotated output of either kind, ready to return to a caller.
#[derive(Debug, Clone)]
pub struct ProcessedMedia {
    pub output: Vec<u8>,
    pub mime: &'static str,
    pub num_students: u64,
}

/// Everything a job needs, constructed once at startup and shared.
#[derive(Clone)]
pub struct Pipeline {
    detector: Arc<dyn Detector>,
    annotator: Arc<dyn Annotator>,
    tools: MediaTools,
    depth: usize,
}

/// Aborts the decode task if the job ends early.
struct DecodeTask(JoinHandle<()>);

impl Drop for DecodeTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl Pipeline {
    pub fn new(
        detector: Arc<dyn Detector>,
        annotator: Arc<dyn Annotator>,
        tools: MediaTools,
        depth: usize,
    ) -> Self {
        Self {
            detector,
            annotator,
            tools,
            depth: depth.max(1),
        }
    }

    /// Process an upload of the declared kind.
    pub async fn process(
        &self,
        kind: MediaKind,
        bytes: &[u8],
        cancel: &CancellationToken,
    ) -> Result<ProcessedMedia, PipelineError> {
        match kind {
            MediaKind::Image => {
                let outcome = self.process_image(bytes, cancel).await?;
                Ok(ProcessedMedia {
                    output: outcome.jpeg,
                    mime: rollcall_core::data_url::MIME_JPEG,
                    num_students: outcome.num_students,
                })
            }
            MediaKind::Video => {
                let outcome = self.process_video(bytes, cancel).await?;
                Ok(ProcessedMedia {
                    output: outcome.mp4,
                    mime: rollcall_core::data_url::MIME_MP4,
                    num_students: outcome.tally.representative_count,
                })
            }
        }
    }

    /// Detect, annotate and re-encode a single still image. The count is the
    /// image's own detection count.
    pub async fn process_image(
        &self,
        bytes: &[u8],
        cancel: &CancellationToken,
    ) -> Result<ImageOutcome, PipelineError> {
        let frame = decode_image(bytes)?;
        let (width, height) = (frame.width, frame.height);

        let detections = self.detect(&frame, cancel).await?;
        let num_students = detections.count() as u64;

        let annotated = annotate_frame(self.annotator.as_ref(), frame, &detections)?;
        let jpeg = encode_jpeg(annotated)?;

        tracing::info!(width, height, num_students, "Image job complete");
        Ok(ImageOutcome {
            jpeg,
            width,
            height,
            num_students,
        })
    }

    /// Run a whole clip through decode, detect, annotate and encode.
    pub async fn process_video(
        &self,
        bytes: &[u8],
        cancel: &CancellationToken,
    ) -> Result<VideoOutcome, PipelineError> {
        let source = VideoSource::open(bytes, &self.tools).await?;
        let meta = source.meta();
        let mut sink = VideoSink::create(meta, &self.tools).await?;
        let mut job = VideoJob::new(bytes.len(), meta);

        self.run_frames(source, &mut sink, &mut job, cancel).await?;

        let frames_written = sink.frames_written();
        let mp4 = sink.finish().await?;
        let input_bytes = job.input_bytes;
        let tally = job.finish();

        tracing::info!(
            input_bytes,
            output_bytes = mp4.len(),
            width = meta.width,
            height = meta.height,
            frame_rate = meta.frame_rate,
            frame_count = tally.frame_count,
            frames_written,
            total_detected = tally.total_detected,
            num_students = tally.representative_count,
            "Video job complete"
        );
        Ok(VideoOutcome { mp4, meta, tally })
    }

    /// Drive `source` to exhaustion, recording each frame's count on `job`
    /// and handing annotated frames to `sink` in source order.
    ///
    /// The first error from any stage aborts the loop; the decode task is
    /// stopped and reaped before returning either way.
    pub async fn run_frames<S, K>(
        &self,
        source: S,
        sink: &mut K,
        job: &mut VideoJob,
        cancel: &CancellationToken,
    ) -> Result<(), PipelineError>
    where
        S: FrameSource + 'static,
        K: FrameSink,
    {
        let (tx, mut rx) = mpsc::channel(self.depth);
        let mut decoder = DecodeTask(tokio::spawn(pump(source, tx)));

        let result = self.consume(&mut rx, sink, job, cancel).await;

        drop(rx);
        decoder.0.abort();
        let _ = (&mut decoder.0).await;

        if let Err(err) = &result {
            tracing::warn!(
                error = %err,
                frames_processed = job.frame_count(),
                "Video job aborted"
            );
        }
        result
    }

    /// Detect, annotate and write each received frame in arrival order.
    async fn consume<K: FrameSink>(
        &self,
        rx: &mut mpsc::Receiver<Result<Frame, PipelineError>>,
        sink: &mut K,
        job: &mut VideoJob,
        cancel: &CancellationToken,
    ) -> Result<(), PipelineError> {
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
                next = rx.recv() => next,
            };
            let Some(frame) = next else {
                return Ok(());
            };
            let frame = frame?;

            let detections = self.detect(&frame, cancel).await?;
            job.record(detections.count());

            let annotated = annotate_frame(self.annotator.as_ref(), frame, &detections)?;
            sink.write_frame(&annotated).await?;
        }
    }

    async fn detect(
        &self,
        frame: &Frame,
        cancel: &CancellationToken,
    ) -> Result<DetectionResult, PipelineError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PipelineError::Cancelled),
            result = self.detector.detect(frame) => result.map_err(|source| PipelineError::Detection {
                frame_index: frame.index,
                source,
            }),
        }
    }
}

/// Decode-stage task: forward frames until exhaustion, error, or until the
/// consumer goes away.
async fn pump<S: FrameSource>(mut source: S, tx: mpsc::Sender<Result<Frame, PipelineError>>) {
    loop {
        match source.next_frame().await {
            Ok(Some(frame)) => {
                if tx.send(Ok(frame)).await.is_err() {
                    return;
                }
            }
            Ok(None) => return,
            Err(err) => {
                let _ = tx.send(Err(err)).await;
                return;
            }
        }
    }
}
