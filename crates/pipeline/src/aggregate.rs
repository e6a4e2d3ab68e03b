//! Per-clip count aggregation.

use crate::frame::VideoMeta;

/// Floor average of per-frame counts; `0` for a clip with no frames.
pub fn representative_count(total_detected: u64, frame_count: u64) -> u64 {
    if frame_count == 0 {
        0
    } else {
        total_detected / frame_count
    }
}

/// Running totals for one video request.
///
/// Created when the clip is opened, updated once per frame, then consumed by
/// [`VideoJob::finish`].
#[derive(Debug, Clone)]
pub struct VideoJob {
    pub input_bytes: usize,
    pub meta: VideoMeta,
    frame_count: u64,
    total_detected: u64,
}

/// Final totals of a finished video job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoTally {
    pub frame_count: u64,
    pub total_detected: u64,
    pub representative_count: u64,
}

impl VideoJob {
    pub fn new(input_bytes: usize, meta: VideoMeta) -> Self {
        Self {
            input_bytes,
            meta,
            frame_count: 0,
            total_detected: 0,
        }
    }

    /// Account for one processed frame.
    pub fn record(&mut self, detected: usize) {
        self.frame_count += 1;
        self.total_detected += detected as u64;
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn total_detected(&self) -> u64 {
        self.total_detected
    }

    pub fn finish(self) -> VideoTally {
        VideoTally {
            frame_count: self.frame_count,
            total_detected: self.total_detected,
            representative_count: representative_count(self.total_detected, self.frame_count),
        }
    }
}
