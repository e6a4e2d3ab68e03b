//! Raw frames and clip metadata.

/// Byte order of the three colour channels in a packed frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

/// What the caller declared the upload to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// Bytes per packed pixel.
pub const CHANNELS: usize = 3;

/// One decoded picture. Owned by the loop iteration that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Ordinal position within the source clip, starting at 0.
    pub index: u64,
    pub order: ChannelOrder,
    /// Packed 8-bit pixels, `width * height * 3` bytes, row-major.
    pub data: Vec<u8>,
}

impl Frame {
    /// Number of bytes a packed frame of this size occupies.
    pub fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * CHANNELS
    }

    /// Build an RGB frame, checking the buffer length.
    pub fn from_rgb(width: u32, height: u32, index: u64, data: Vec<u8>) -> Option<Self> {
        (data.len() == Self::byte_len(width, height)).then_some(Frame {
            width,
            height,
            index,
            order: ChannelOrder::Rgb,
            data,
        })
    }

    /// Solid-colour RGB frame.
    pub fn filled(width: u32, height: u32, index: u64, rgb: [u8; 3]) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take(Self::byte_len(width, height))
            .collect();
        Frame {
            width,
            height,
            index,
            order: ChannelOrder::Rgb,
            data,
        }
    }

    /// Reorder channels in place if `target` differs from the current order.
    pub fn into_channel_order(mut self, target: ChannelOrder) -> Self {
        if self.order != target {
            for px in self.data.chunks_exact_mut(CHANNELS) {
                px.swap(0, 2);
            }
            self.order = target;
        }
        self
    }

    /// The pixel at `(x, y)` as `[r, g, b]` regardless of storage order.
    pub fn rgb_at(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let px = &self.data[i..i + CHANNELS];
        Some(match self.order {
            ChannelOrder::Rgb => [px[0], px[1], px[2]],
            ChannelOrder::Bgr => [px[2], px[1], px[0]],
        })
    }
}

/// Resolution and rate of a video container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoMeta {
    pub width: u32,
    pub height: u32,
    /// Always positive; see [`crate::decode::DEFAULT_FRAME_RATE`].
    pub frame_rate: f64,
}
