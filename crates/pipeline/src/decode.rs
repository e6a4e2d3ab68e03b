//! Media decoding: still images in-process, video through an `ffmpeg` child.

use std::process::Stdio;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};

use crate::error::PipelineError;
use crate::ffmpeg::{self, FfmpegError, MediaTools};
use crate::frame::{ChannelOrder, Frame, VideoMeta};

/// Substituted when a container reports a zero, missing or unusable rate.
pub const DEFAULT_FRAME_RATE: f64 = 25.0;

/// Replace a non-positive or non-finite rate with [`DEFAULT_FRAME_RATE`].
pub fn normalize_frame_rate(reported: f64) -> f64 {
    if reported.is_finite() && reported > 0.0 {
        reported
    } else {
        DEFAULT_FRAME_RATE
    }
}

/// Decode a still image (any format the `image` crate recognizes) into one
/// RGB frame.
pub fn decode_image(bytes: &[u8]) -> Result<Frame, PipelineError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| PipelineError::Decode(format!("unrecognized image: {e}")))?;
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    Frame::from_rgb(width, height, 0, rgb.into_raw())
        .ok_or_else(|| PipelineError::Decode("decoded image buffer has the wrong size".into()))
}

/// A forward-only, finite sequence of frames.
#[async_trait]
pub trait FrameSource: Send {
    /// The next frame in clip order, or `None` once the source is exhausted.
    async fn next_frame(&mut self) -> Result<Option<Frame>, PipelineError>;
}

/// Frames of an uploaded clip, decoded lazily by an `ffmpeg` child process.
///
/// The upload is written to a scratch file for the lifetime of the source.
/// Dropping the source kills the child and deletes the scratch file, whether
/// decoding finished, failed or was abandoned.
#[derive(Debug)]
pub struct VideoSource {
    meta: VideoMeta,
    child: Child,
    stdout: ChildStdout,
    frame_len: usize,
    next_index: u64,
    finished: bool,
    // Declared last so it outlives the child.
    _scratch: NamedTempFile,
}

impl VideoSource {
    /// Write `bytes` to scratch, probe the container and start decoding.
    pub async fn open(bytes: &[u8], tools: &MediaTools) -> Result<Self, PipelineError> {
        let scratch = tools.scratch_file(".video")?;
        tokio::fs::write(scratch.path(), bytes).await?;

        let probe = ffmpeg::probe_video(tools, scratch.path())
            .await
            .map_err(PipelineError::decode)?;
        if ffmpeg::first_video_stream(&probe).is_none() {
            return Err(PipelineError::decode(FfmpegError::NoVideoStream));
        }

        let (width, height) = ffmpeg::parse_resolution(&probe);
        if width == 0 || height == 0 {
            return Err(PipelineError::Decode(format!(
                "video stream reports unusable resolution {width}x{height}"
            )));
        }

        let reported = ffmpeg::parse_framerate(&probe);
        let frame_rate = normalize_frame_rate(reported);
        if frame_rate != reported {
            tracing::warn!(reported, frame_rate, "Container frame rate unusable, using default");
        }

        let mut child = Command::new(&tools.ffmpeg)
            // Frames stay in stored orientation so they match the probed size.
            .args(["-v", "error", "-nostdin", "-noautorotate", "-i"])
            .arg(scratch.path())
            .args([
                "-map",
                "0:v:0",
                "-fps_mode",
                "passthrough",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "-",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PipelineError::decode(FfmpegError::NotFound(e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| PipelineError::Decode("ffmpeg stdout unavailable".into()))?;

        let meta = VideoMeta {
            width,
            height,
            frame_rate,
        };
        tracing::debug!(width, height, frame_rate, "Opened video for decoding");

        Ok(Self {
            meta,
            child,
            stdout,
            frame_len: Frame::byte_len(width, height),
            next_index: 0,
            finished: false,
            _scratch: scratch,
        })
    }

    pub fn meta(&self) -> VideoMeta {
        self.meta
    }

    /// Frames handed out so far.
    pub fn frames_decoded(&self) -> u64 {
        self.next_index
    }

    /// Reap the decoder once its output is exhausted.
    ///
    /// A failed exit or a partial trailing frame fails the whole clip, no
    /// matter how many frames were already handed out.
    async fn finish(&mut self, trailing_bytes: usize) -> Result<(), PipelineError> {
        self.finished = true;

        let status = self.child.wait().await?;
        if !status.success() {
            tracing::warn!(
                exit_code = ?status.code(),
                frames = self.next_index,
                "ffmpeg exited with an error"
            );
            return Err(PipelineError::Decode(format!(
                "ffmpeg could not decode video after {} frames (exit code {:?})",
                self.next_index,
                status.code()
            )));
        }
        if trailing_bytes > 0 {
            return Err(PipelineError::Decode(format!(
                "decoder output ended inside frame {} ({trailing_bytes} of {} bytes)",
                self.next_index, self.frame_len
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl FrameSource for VideoSource {
    async fn next_frame(&mut self) -> Result<Option<Frame>, PipelineError> {
        if self.finished {
            return Ok(None);
        }

        let mut buf = vec![0u8; self.frame_len];
        let mut filled = 0;
        while filled < self.frame_len {
            let n = self.stdout.read(&mut buf[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        if filled < self.frame_len {
            self.finish(filled).await?;
            return Ok(None);
        }

        let frame = Frame {
            width: self.meta.width,
            height: self.meta.height,
            index: self.next_index,
            order: ChannelOrder::Rgb,
            data: buf,
        };
        self.next_index += 1;
        Ok(Some(frame))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use assert_matches::assert_matches;

    use super::*;

    fn png_bytes(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn rate_fallback_applies_to_zero_and_nan() {
        assert_eq!(normalize_frame_rate(0.0), DEFAULT_FRAME_RATE);
        assert_eq!(normalize_frame_rate(-3.0), DEFAULT_FRAME_RATE);
        assert_eq!(normalize_frame_rate(f64::NAN), DEFAULT_FRAME_RATE);
        assert_eq!(normalize_frame_rate(30.0), 30.0);
    }

    #[test]
    fn decodes_png_into_single_rgb_frame() {
        let frame = decode_image(&png_bytes(8, 4, [200, 10, 20])).unwrap();
        assert_eq!((frame.width, frame.height, frame.index), (8, 4, 0));
        assert_eq!(frame.order, ChannelOrder::Rgb);
        assert_eq!(frame.data.len(), 8 * 4 * 3);
        assert_eq!(frame.rgb_at(3, 2), Some([200, 10, 20]));
    }

    #[test]
    fn rejects_non_image_bytes() {
        assert_matches!(
            decode_image(b"definitely not an image"),
            Err(PipelineError::Decode(_))
        );
    }
}
