//! Drawing detections onto frames.
//!
//! An annotator declares the channel order it draws in. The pipeline converts
//! each frame into that order before annotating and back to RGB (the
//! encoder's order) afterwards, so a BGR-minded annotator cannot tint the
//! output video.

use crate::detection::{BoundingBox, DetectionResult};
use crate::error::PipelineError;
use crate::frame::{ChannelOrder, Frame, CHANNELS};

/// Overlays detection markers on a frame.
///
/// The returned frame must have the same dimensions as the input.
pub trait Annotator: Send + Sync {
    /// Channel order `annotate` expects its input in and produces.
    fn channel_order(&self) -> ChannelOrder;

    fn annotate(&self, frame: Frame, detections: &DetectionResult) -> Frame;
}

/// Run `annotator` with explicit channel-order normalization on both sides.
pub fn annotate_frame(
    annotator: &dyn Annotator,
    frame: Frame,
    detections: &DetectionResult,
) -> Result<Frame, PipelineError> {
    let (index, width, height) = (frame.index, frame.width, frame.height);
    let expected = annotator.channel_order();

    let annotated = annotator.annotate(frame.into_channel_order(expected), detections);

    if annotated.width != width
        || annotated.height != height
        || annotated.data.len() != Frame::byte_len(width, height)
    {
        return Err(PipelineError::Annotate {
            frame_index: index,
            reason: format!(
                "annotator returned {}x{}, expected {width}x{height}",
                annotated.width, annotated.height
            ),
        });
    }
    if annotated.order != expected {
        return Err(PipelineError::Annotate {
            frame_index: index,
            reason: format!("annotator returned {:?} pixels, declared {expected:?}", annotated.order),
        });
    }

    Ok(annotated.into_channel_order(ChannelOrder::Rgb))
}

/// Draws a hollow rectangle around each detection.
#[derive(Debug, Clone)]
pub struct BoxOutlineAnnotator {
    /// Outline colour as `[r, g, b]`.
    pub color: [u8; 3],
    /// Line thickness in pixels.
    pub thickness: u32,
}

impl Default for BoxOutlineAnnotator {
    fn default() -> Self {
        Self {
            color: [0, 255, 0],
            thickness: 2,
        }
    }
}

impl BoxOutlineAnnotator {
    fn paint(&self, frame: &mut Frame, x: u32, y: u32) {
        let i = (y as usize * frame.width as usize + x as usize) * CHANNELS;
        let [r, g, b] = self.color;
        frame.data[i..i + CHANNELS].copy_from_slice(&[r, g, b]);
    }

    fn draw_box(&self, frame: &mut Frame, bbox: &BoundingBox) {
        if frame.width == 0 || frame.height == 0 {
            return;
        }
        let max_x = frame.width - 1;
        let max_y = frame.height - 1;
        // Entirely outside the frame.
        if bbox.x + bbox.width < 0.0
            || bbox.y + bbox.height < 0.0
            || bbox.x > max_x as f32
            || bbox.y > max_y as f32
        {
            return;
        }

        let clamp = |v: f32, max: u32| -> u32 { (v.max(0.0) as u32).min(max) };
        let x0 = clamp(bbox.x, max_x);
        let y0 = clamp(bbox.y, max_y);
        let x1 = clamp(bbox.x + bbox.width, max_x);
        let y1 = clamp(bbox.y + bbox.height, max_y);

        let t = self.thickness.max(1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let on_edge = x < x0 + t || x + t > x1 || y < y0 + t || y + t > y1;
                if on_edge {
                    self.paint(frame, x, y);
                }
            }
        }
    }
}

impl Annotator for BoxOutlineAnnotator {
    fn channel_order(&self) -> ChannelOrder {
        ChannelOrder::Rgb
    }

    fn annotate(&self, mut frame: Frame, detections: &DetectionResult) -> Frame {
        for bbox in &detections.boxes {
            self.draw_box(&mut frame, bbox);
        }
        frame
    }
}
