//! Owned frame buffers and region operations.
//!
//! `FrameBuf` is the unit of video processing: an interleaved RGB24 image
//! with no stride padding. Region crop/blit operate on clamped, non-empty
//! rectangles; callers clamp first via [`PixelRect::clamp_to`].

use crate::rect::PixelRect;

/// Errors raised by frame buffer construction and region operations.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("buffer length {actual} does not match {width}x{height}x{channels}")]
    LengthMismatch {
        width: u32,
        height: u32,
        channels: u32,
        actual: usize,
    },

    #[error("region {rect:?} does not fit a {width}x{height} frame")]
    RegionOutOfBounds {
        rect: PixelRect,
        width: u32,
        height: u32,
    },

    #[error("block shape {block_w}x{block_h} does not match region {rect:?}")]
    BlockShapeMismatch {
        rect: PixelRect,
        block_w: u32,
        block_h: u32,
    },
}

/// An owned interleaved RGB24 frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuf {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl FrameBuf {
    const CHANNELS: u32 = 3;

    /// Create a black frame of the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width * height * Self::CHANNELS) as usize],
        }
    }

    /// Wrap an existing RGB24 buffer, validating its length.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameError> {
        let expected = (width * height * Self::CHANNELS) as usize;
        if data.len() != expected {
            return Err(FrameError::LengthMismatch {
                width,
                height,
                channels: Self::CHANNELS,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` pair.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the frame and return the raw buffer.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Pixel at `(x, y)` as an RGB triple. Panics out of bounds, like slice
    /// indexing.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = ((y * self.width + x) * Self::CHANNELS) as usize;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Convert to a single-channel luma frame (BT.601 weights).
    pub fn to_gray(&self) -> GrayFrame {
        let mut data = Vec::with_capacity((self.width * self.height) as usize);
        for px in self.data.chunks_exact(3) {
            let luma =
                (299 * px[0] as u32 + 587 * px[1] as u32 + 114 * px[2] as u32) / 1000;
            data.push(luma as u8);
        }
        GrayFrame {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// Copy out the pixel block covered by `rect`.
    ///
    /// `rect` must be non-empty and lie fully inside the frame.
    pub fn crop(&self, rect: PixelRect) -> Result<FrameBuf, FrameError> {
        self.check_region(rect)?;
        let (x, y, w, h) = (rect.x as u32, rect.y as u32, rect.w as u32, rect.h as u32);
        let mut data = Vec::with_capacity((w * h * Self::CHANNELS) as usize);
        for row in y..y + h {
            let start = ((row * self.width + x) * Self::CHANNELS) as usize;
            let end = start + (w * Self::CHANNELS) as usize;
            data.extend_from_slice(&self.data[start..end]);
        }
        Ok(FrameBuf {
            width: w,
            height: h,
            data,
        })
    }

    /// Paste a same-shape block over the pixel region covered by `rect`.
    pub fn blit(&mut self, rect: PixelRect, block: &FrameBuf) -> Result<(), FrameError> {
        self.check_region(rect)?;
        if block.width != rect.w as u32 || block.height != rect.h as u32 {
            return Err(FrameError::BlockShapeMismatch {
                rect,
                block_w: block.width,
                block_h: block.height,
            });
        }
        let (x, y, w, h) = (rect.x as u32, rect.y as u32, rect.w as u32, rect.h as u32);
        for row in 0..h {
            let dst_start = (((y + row) * self.width + x) * Self::CHANNELS) as usize;
            let src_start = (row * w * Self::CHANNELS) as usize;
            let len = (w * Self::CHANNELS) as usize;
            self.data[dst_start..dst_start + len]
                .copy_from_slice(&block.data[src_start..src_start + len]);
        }
        Ok(())
    }

    fn check_region(&self, rect: PixelRect) -> Result<(), FrameError> {
        if rect.is_empty()
            || rect.x < 0
            || rect.y < 0
            || rect.right() > self.width as i32
            || rect.bottom() > self.height as i32
        {
            return Err(FrameError::RegionOutOfBounds {
                rect,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// A single-channel (luma) frame, the input contract for face detectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayFrame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl GrayFrame {
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameError> {
        let expected = (width * height) as usize;
        if data.len() != expected {
            return Err(FrameError::LengthMismatch {
                width,
                height,
                channels: 1,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Luma value at `(x, y)`.
    pub fn luma(&self, x: u32, y: u32) -> u8 {
        self.data[(y * self.width + x) as usize]
    }
}
