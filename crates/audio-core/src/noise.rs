//! Additive-noise voice scrambler.
//!
//! The lighter obfuscation variant: every sample gets uniform random noise
//! added, saturating at the 16-bit range. No resampling, no state beyond the
//! generator itself.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::transform::ChunkTransform;

/// Noise scrambler knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseConfig {
    /// Peak noise amplitude as a fraction of full scale.
    pub amplitude: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self { amplitude: 0.1 }
    }
}

/// Buries a voice under uniform noise.
pub struct NoiseScrambler {
    peak: i32,
    rng: StdRng,
}

impl NoiseScrambler {
    pub fn new(config: NoiseConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    pub fn with_seed(config: NoiseConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: NoiseConfig, rng: StdRng) -> Self {
        let peak = (i16::MAX as f64 * config.amplitude.clamp(0.0, 1.0)) as i32;
        Self { peak, rng }
    }
}

impl ChunkTransform for NoiseScrambler {
    fn process_chunk(&mut self, samples: &[i16]) -> Vec<i16> {
        if self.peak == 0 {
            return samples.to_vec();
        }
        samples
            .iter()
            .map(|&s| {
                let noise = self.rng.random_range(-self.peak..=self.peak);
                (s as i32 + noise).clamp(i16::MIN as i32, i16::MAX as i32) as i16
            })
            .collect()
    }
}
