//! Media encoding: JPEG for still images, MP4 through an `ffmpeg` child.

use std::io::Cursor;
use std::process::Stdio;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};

use crate::error::PipelineError;
use crate::ffmpeg::{FfmpegError, MediaTools};
use crate::frame::{ChannelOrder, Frame, VideoMeta};

/// Encode one frame as JPEG.
pub fn encode_jpeg(frame: Frame) -> Result<Vec<u8>, PipelineError> {
    let frame = frame.into_channel_order(ChannelOrder::Rgb);
    let img = image::RgbImage::from_raw(frame.width, frame.height, frame.data)
        .ok_or_else(|| PipelineError::Encode("frame buffer does not match its dimensions".into()))?;

    let mut out = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Jpeg)
        .map_err(|e| PipelineError::Encode(format!("JPEG encoding failed: {e}")))?;
    Ok(out)
}

/// Format a frame rate as an ffmpeg rational.
///
/// MPEG-4 Part 2 rejects time-base denominators above 65535, so NTSC-style
/// rates become `n*1000/1001` and anything else is kept to millisecond
/// precision.
fn rate_arg(rate: f64) -> String {
    let ntsc = (rate * 1001.0 / 1000.0).round();
    if ntsc >= 1.0 && (ntsc * 1000.0 / 1001.0 - rate).abs() < 1e-3 && rate.fract() != 0.0 {
        return format!("{}/1001", ntsc as u64 * 1000);
    }
    if (rate - rate.round()).abs() < 1e-6 {
        return format!("{}", rate.round() as u64);
    }
    format!("{}/1000", (rate * 1000.0).round() as u64)
}

/// Ordered consumer of annotated frames.
#[async_trait]
pub trait FrameSink: Send {
    async fn write_frame(&mut self, frame: &Frame) -> Result<(), PipelineError>;
}

/// MP4 writer fed with packed RGB frames over an `ffmpeg` stdin pipe.
///
/// Output goes to a scratch file that is read back by [`VideoSink::finish`]
/// and deleted when the sink is dropped, on success or failure.
pub struct VideoSink {
    meta: VideoMeta,
    child: Child,
    stdin: Option<ChildStdin>,
    frames_written: u64,
    output: NamedTempFile,
}

impl VideoSink {
    /// Start an encoder producing `meta.width`x`meta.height` at `meta.frame_rate`.
    pub async fn create(meta: VideoMeta, tools: &MediaTools) -> Result<Self, PipelineError> {
        let output = tools.scratch_file(".mp4")?;
        let size = format!("{}x{}", meta.width, meta.height);
        let rate = rate_arg(meta.frame_rate);

        let mut child = Command::new(&tools.ffmpeg)
            .args(["-v", "error", "-y", "-f", "rawvideo", "-pix_fmt", "rgb24", "-s"])
            .arg(&size)
            .arg("-r")
            .arg(&rate)
            .args([
                "-i",
                "-",
                "-an",
                "-c:v",
                "mpeg4",
                "-q:v",
                "3",
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
                "-f",
                "mp4",
            ])
            .arg(output.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PipelineError::encode(FfmpegError::NotFound(e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| PipelineError::Encode("ffmpeg stdin unavailable".into()))?;

        Ok(Self {
            meta,
            child,
            stdin: Some(stdin),
            frames_written: 0,
            output,
        })
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Close the input, wait for the encoder and read the container back.
    ///
    /// A sink that received no frames yields an empty payload.
    pub async fn finish(mut self) -> Result<Vec<u8>, PipelineError> {
        drop(self.stdin.take());

        if self.frames_written == 0 {
            tracing::warn!("No frames to encode, returning empty video");
            return Ok(Vec::new());
        }

        let output = self
            .child
            .wait_with_output()
            .await
            .map_err(|e| PipelineError::encode(FfmpegError::IoError(e)))?;
        if !output.status.success() {
            return Err(PipelineError::encode(FfmpegError::ExecutionFailed {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            }));
        }

        let bytes = tokio::fs::read(self.output.path()).await?;
        tracing::debug!(
            frames = self.frames_written,
            bytes = bytes.len(),
            "Encoded video"
        );
        Ok(bytes)
    }
}

#[async_trait]
impl FrameSink for VideoSink {
    async fn write_frame(&mut self, frame: &Frame) -> Result<(), PipelineError> {
        if frame.width != self.meta.width || frame.height != self.meta.height {
            return Err(PipelineError::Encode(format!(
                "frame {} is {}x{}, encoder expects {}x{}",
                frame.index, frame.width, frame.height, self.meta.width, self.meta.height
            )));
        }
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| PipelineError::Encode("encoder input already closed".into()))?;

        let result = if frame.order == ChannelOrder::Rgb {
            stdin.write_all(&frame.data).await
        } else {
            let rgb = frame.clone().into_channel_order(ChannelOrder::Rgb);
            stdin.write_all(&rgb.data).await
        };
        result.map_err(|e| {
            PipelineError::Encode(format!("ffmpeg stopped accepting frames at {}: {e}", frame.index))
        })?;

        self.frames_written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_image;

    #[test]
    fn jpeg_round_trip_preserves_dimensions() {
        let frame = Frame::filled(16, 8, 0, [0, 128, 255]);
        let jpeg = encode_jpeg(frame).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let decoded = decode_image(&jpeg).unwrap();
        assert_eq!((decoded.width, decoded.height), (16, 8));
    }

    #[test]
    fn jpeg_accepts_bgr_frames() {
        let frame = Frame::filled(4, 4, 0, [255, 0, 0]).into_channel_order(ChannelOrder::Bgr);
        let decoded = decode_image(&encode_jpeg(frame).unwrap()).unwrap();
        let [r, _, b] = decoded.rgb_at(1, 1).unwrap();
        assert!(r > 200 && b < 60, "expected red, got r={r} b={b}");
    }

    #[test]
    fn rate_arg_keeps_mpeg4_time_base_small() {
        assert_eq!(rate_arg(25.0), "25");
        assert_eq!(rate_arg(30000.0 / 1001.0), "30000/1001");
        assert_eq!(rate_arg(23.976), "24000/1001");
        assert_eq!(rate_arg(12.5), "12500/1000");
    }

    #[test]
    fn jpeg_rejects_mismatched_buffer() {
        let mut frame = Frame::filled(4, 4, 0, [0, 0, 0]);
        frame.data.truncate(10);
        assert!(encode_jpeg(frame).is_err());
    }
}
