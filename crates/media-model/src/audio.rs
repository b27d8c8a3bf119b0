//! PCM stream format descriptors.
//!
//! The audio core handles 16-bit signed interleaved PCM only; this module
//! carries the format parameters that travel with a stream. Chunks are plain
//! `&[i16]` slices with no retained identity.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Bytes per 16-bit sample.
pub const BYTES_PER_SAMPLE: usize = 2;

/// Format of a 16-bit signed interleaved PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    /// Frames per second.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
}

impl AudioFormat {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Interleaved samples in a chunk of `chunk_frames` frames.
    pub fn samples_per_chunk(&self, chunk_frames: usize) -> usize {
        chunk_frames * self.channels as usize
    }

    /// Bytes in a chunk of `chunk_frames` frames.
    pub fn bytes_per_chunk(&self, chunk_frames: usize) -> usize {
        self.samples_per_chunk(chunk_frames) * BYTES_PER_SAMPLE
    }

    /// Bytes consumed per second of audio.
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.channels as u32 * BYTES_PER_SAMPLE as u32
    }

    /// Bytes in one interleaved frame.
    pub fn block_align(&self) -> u16 {
        self.channels * BYTES_PER_SAMPLE as u16
    }

    /// Wall-clock duration of `n_samples` interleaved samples.
    pub fn duration_of(&self, n_samples: usize) -> Duration {
        let frames = n_samples as u64 / self.channels as u64;
        Duration::from_nanos(frames * 1_000_000_000 / self.sample_rate as u64)
    }
}

impl Default for AudioFormat {
    /// 48 kHz stereo, the nominal capture format.
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            channels: 2,
        }
    }
}
