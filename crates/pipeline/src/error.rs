use crate::ffmpeg::FfmpegError;

/// Failure reported by a [`Detector`](crate::detection::Detector).
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("detection request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("detection service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not prepare frame for detection: {0}")]
    Frame(String),
}

/// Errors raised while processing one image or video job.
///
/// Any error aborts the whole job; there is no partial result.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The payload is not a recognizable image or video, or the decoder
    /// failed partway through it.
    #[error("could not decode media: {0}")]
    Decode(String),

    #[error("detection failed on frame {frame_index}: {source}")]
    Detection {
        frame_index: u64,
        #[source]
        source: DetectionError,
    },

    #[error("annotation failed on frame {frame_index}: {reason}")]
    Annotate { frame_index: u64, reason: String },

    /// The output container could not be produced.
    #[error("could not encode media: {0}")]
    Encode(String),

    #[error("job cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub(crate) fn decode(err: FfmpegError) -> Self {
        PipelineError::Decode(err.to_string())
    }

    pub(crate) fn encode(err: FfmpegError) -> Self {
        PipelineError::Encode(err.to_string())
    }
}
