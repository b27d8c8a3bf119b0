//! Region blurring.
//!
//! The blur primitive is a strategy: given a pixel block it returns a heavily
//! smoothed block of the same shape. The built-in [`BoxBlur`] runs three
//! separable box passes, which approximates a large-kernel Gaussian at a
//! fraction of the cost.

use obscura_media_model::{FrameBuf, PixelRect};

/// Heavy smoothing primitive applied to face blocks.
pub trait RegionBlur {
    /// Blur a pixel block. The output must have the input's shape.
    fn blur(&self, block: &FrameBuf) -> FrameBuf;
}

/// Iterated separable box blur.
#[derive(Debug, Clone)]
pub struct BoxBlur {
    /// Box radius per pass, in pixels.
    pub radius: u32,
    /// Number of box passes. Three passes approximate a Gaussian.
    pub passes: u32,
}

impl Default for BoxBlur {
    /// Radius 13 over three passes: effective sigma around 13, heavy enough
    /// that no facial detail survives.
    fn default() -> Self {
        Self {
            radius: 13,
            passes: 3,
        }
    }
}

impl RegionBlur for BoxBlur {
    fn blur(&self, block: &FrameBuf) -> FrameBuf {
        let mut current = block.clone();
        for _ in 0..self.passes {
            current = box_pass_horizontal(&current, self.radius);
            current = box_pass_vertical(&current, self.radius);
        }
        current
    }
}

/// One horizontal box pass with clamped edges.
fn box_pass_horizontal(src: &FrameBuf, radius: u32) -> FrameBuf {
    let (width, height) = src.dimensions();
    if radius == 0 || width == 0 {
        return src.clone();
    }
    let r = radius.min(width.saturating_sub(1)) as i64;
    let window = (2 * r + 1) as u32;
    let mut out = vec![0u8; src.data().len()];

    for y in 0..height {
        for c in 0..3usize {
            // Sliding window over the row, edge pixels replicated.
            let sample = |x: i64| -> u32 {
                let x = x.clamp(0, width as i64 - 1) as u32;
                src.pixel(x, y)[c] as u32
            };
            let mut sum: u32 = (-r..=r).map(sample).sum();
            for x in 0..width {
                let i = ((y * width + x) * 3) as usize + c;
                out[i] = (sum / window) as u8;
                sum += sample(x as i64 + r + 1);
                sum -= sample(x as i64 - r);
            }
        }
    }

    FrameBuf::from_raw(width, height, out).expect("shape preserved")
}

/// One vertical box pass with clamped edges.
fn box_pass_vertical(src: &FrameBuf, radius: u32) -> FrameBuf {
    let (width, height) = src.dimensions();
    if radius == 0 || height == 0 {
        return src.clone();
    }
    let r = radius.min(height.saturating_sub(1)) as i64;
    let window = (2 * r + 1) as u32;
    let mut out = vec![0u8; src.data().len()];

    for x in 0..width {
        for c in 0..3usize {
            let sample = |y: i64| -> u32 {
                let y = y.clamp(0, height as i64 - 1) as u32;
                src.pixel(x, y)[c] as u32
            };
            let mut sum: u32 = (-r..=r).map(sample).sum();
            for y in 0..height {
                let i = ((y * width + x) * 3) as usize + c;
                out[i] = (sum / window) as u8;
                sum += sample(y as i64 + r + 1);
                sum -= sample(y as i64 - r);
            }
        }
    }

    FrameBuf::from_raw(width, height, out).expect("shape preserved")
}

/// Blur every given region of the frame in place.
///
/// Regions are expected to be clamped and non-empty (the pool's geometry
/// filter guarantees this); anything that still fails to crop is skipped so
/// one bad region never takes down the frame.
pub fn blur_regions(frame: &mut FrameBuf, regions: &[PixelRect], blur: &dyn RegionBlur) -> usize {
    let mut applied = 0;
    for &rect in regions {
        let block = match frame.crop(rect) {
            Ok(block) => block,
            Err(e) => {
                tracing::warn!(?rect, error = %e, "skipping unblurrable region");
                continue;
            }
        };
        let blurred = blur.blur(&block);
        match frame.blit(rect, &blurred) {
            Ok(()) => applied += 1,
            Err(e) => {
                tracing::warn!(?rect, error = %e, "blur primitive changed block shape");
            }
        }
    }
    applied
}
