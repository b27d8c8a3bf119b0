//! Randomized pitch modulation.
//!
//! The modulator holds one scalar pitch factor and re-draws it at random on
//! a fixed chunk cadence. A factor above 1.0 speeds the voice up by
//! nearest-neighbor decimation; below 1.0 it slows the voice down by sample
//! repetition. Either way the chunk is padded or truncated back to its
//! original length, so downstream consumers never see a size change.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::transform::ChunkTransform;

/// Pitch modulation knobs. Defaults give a strong, frequently-changing
/// disguise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitchConfig {
    /// Band of factors below 1.0 (deeper voice).
    pub low_band: (f64, f64),

    /// Band of factors above 1.0 (higher voice).
    pub high_band: (f64, f64),

    /// Probability of re-drawing the factor on an eligible chunk.
    pub change_probability: f64,

    /// Chunk cadence of redraw eligibility: the factor may only change on
    /// chunk indices that are multiples of this.
    pub change_every_chunks: u64,

    /// Minimum distance from 1.0 an accepted factor must keep. Candidates
    /// closer than this are re-drawn.
    pub min_shift_from_unity: f64,

    /// When set, candidates are snapped to the nearest multiple of this step
    /// instead of being re-drawn — the "robotic" variant.
    pub robotic_step: Option<f64>,

    /// When set, clip every output sample's magnitude to
    /// `i16::MAX * (1.0 - distortion_level)`.
    pub distortion_level: Option<f64>,

    /// Pin the factor instead of drawing it, and suppress redraws. Used for
    /// diagnostics and identity testing.
    pub initial_factor: Option<f64>,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            low_band: (0.5, 0.7),
            high_band: (1.3, 1.6),
            change_probability: 0.9,
            change_every_chunks: 3,
            min_shift_from_unity: 0.15,
            robotic_step: None,
            distortion_level: None,
            initial_factor: None,
        }
    }
}

/// Stateful voice pitch modulator for one audio stream.
pub struct PitchModulator {
    config: PitchConfig,
    current_factor: f64,
    chunk_counter: u64,
    rng: StdRng,
}

impl PitchModulator {
    /// Create a modulator seeded from OS entropy.
    pub fn new(config: PitchConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Create a modulator with a fixed seed for reproducible streams.
    pub fn with_seed(config: PitchConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: PitchConfig, mut rng: StdRng) -> Self {
        let current_factor = match config.initial_factor {
            Some(factor) => factor,
            None => draw_band_factor(&mut rng, &config),
        };
        Self {
            config,
            current_factor,
            chunk_counter: 0,
            rng,
        }
    }

    /// The factor currently applied to chunks.
    pub fn current_factor(&self) -> f64 {
        self.current_factor
    }

    /// Chunks processed so far.
    pub fn chunks_processed(&self) -> u64 {
        self.chunk_counter
    }

    /// Re-draw the factor if this chunk index is eligible and the dice agree.
    fn maybe_redraw(&mut self) {
        if self.config.initial_factor.is_some() {
            return;
        }
        if self.chunk_counter % self.config.change_every_chunks != 0 {
            return;
        }
        if !self.rng.random_bool(self.config.change_probability) {
            return;
        }

        self.current_factor = match self.config.robotic_step {
            // Robotic variant: quantize the draw, no distance check.
            Some(step) => {
                let candidate = draw_band_factor(&mut self.rng, &self.config);
                (candidate / step).round() * step
            }
            // Default: reject draws too close to 1.0 and try again. The
            // stock bands sit entirely outside the threshold, so this
            // terminates on the first draw unless the bands are reconfigured.
            None => loop {
                let candidate = draw_band_factor(&mut self.rng, &self.config);
                if (candidate - 1.0).abs() >= self.config.min_shift_from_unity {
                    break candidate;
                }
            },
        };
        tracing::debug!(factor = self.current_factor, "pitch factor re-drawn");
    }
}

impl ChunkTransform for PitchModulator {
    /// Transform one chunk, preserving its sample count exactly.
    fn process_chunk(&mut self, samples: &[i16]) -> Vec<i16> {
        self.maybe_redraw();

        let mut out = resample(samples, self.current_factor);
        out.resize(samples.len(), 0);

        if let Some(level) = self.config.distortion_level {
            let limit = (i16::MAX as f64 * (1.0 - level)) as i16;
            for sample in &mut out {
                *sample = (*sample).clamp(-limit, limit);
            }
        }

        self.chunk_counter += 1;
        out
    }
}

/// Coin-flip a band, then draw uniformly within it.
fn draw_band_factor(rng: &mut StdRng, config: &PitchConfig) -> f64 {
    let (lo, hi) = if rng.random_bool(0.5) {
        config.low_band
    } else {
        config.high_band
    };
    rng.random_range(lo..hi)
}

/// Nearest-neighbor resample of one chunk by the given factor.
///
/// Above 1.0 the chunk is decimated to `floor(len / factor)` samples taken
/// at evenly spaced indices. Below 1.0 every sample is repeated
/// `floor(1 / factor)` times and the result truncated to the input length.
fn resample(samples: &[i16], factor: f64) -> Vec<i16> {
    let n = samples.len();
    if n == 0 || factor == 1.0 {
        return samples.to_vec();
    }

    if factor > 1.0 {
        let new_len = (n as f64 / factor) as usize;
        match new_len {
            0 => Vec::new(),
            1 => vec![samples[0]],
            _ => {
                let span = (n - 1) as f64 / (new_len - 1) as f64;
                (0..new_len)
                    .map(|i| samples[(i as f64 * span).round() as usize])
                    .collect()
            }
        }
    } else {
        let repeat = (1.0 / factor) as usize;
        samples
            .iter()
            .flat_map(|&s| std::iter::repeat(s).take(repeat))
            .take(n)
            .collect()
    }
}
