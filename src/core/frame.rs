use serde::{Deserialize, Serialize};

/// One image: interleaved 8-bit samples, row-major.
///
/// An empty frame (no pixels) is how sources signal end-of-stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub data: Vec<u8>,
}

impl Frame {
    /// All-zero (black) frame
    pub fn new(width: u32, height: u32, channels: u8) -> Self {
        let len = width as usize * height as usize * channels as usize;
        Self {
            width,
            height,
            channels,
            data: vec![0; len],
        }
    }

    /// Returns `None` if `data` does not match the dimensions.
    pub fn from_data(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(channels as usize)?;
        (data.len() == expected).then_some(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty() || self.width == 0 || self.height == 0
    }

    /// Drop the pixels but keep the allocation.
    pub fn clear(&mut self) {
        self.width = 0;
        self.height = 0;
        self.channels = 0;
        self.data.clear();
    }

    /// Overwrite with `other`, reusing this frame's buffer.
    pub fn assign(&mut self, other: &Frame) {
        self.width = other.width;
        self.height = other.height;
        self.channels = other.channels;
        self.data.clear();
        self.data.extend_from_slice(&other.data);
    }

    pub fn row_stride(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    /// Samples of the pixel at (x, y), if inside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = y as usize * self.row_stride() + x as usize * self.channels as usize;
        self.data.get(start..start + self.channels as usize)
    }

    /// Width over height, or `None` for an empty frame.
    pub fn aspect_ratio(&self) -> Option<f64> {
        (!self.is_empty()).then(|| self.width as f64 / self.height as f64)
    }
}
