//! Obscura Audio Core — voice disguise over PCM chunk streams.
//!
//! - **PitchModulator:** holds a randomized, periodically re-drawn pitch
//!   factor and resamples each fixed-size chunk accordingly
//! - **NoiseScrambler:** lighter variant that buries the voice in additive
//!   uniform noise
//! - **WAV container:** minimal RIFF codec plus a whole-file scramble helper
//!
//! All transforms preserve chunk length exactly: an N-sample chunk in is an
//! N-sample chunk out, for any pitch factor.

pub mod modulator;
pub mod noise;
pub mod transform;
pub mod wav;

pub use modulator::{PitchConfig, PitchModulator};
pub use noise::{NoiseConfig, NoiseScrambler};
pub use transform::ChunkTransform;
pub use wav::{scramble_wav, WavFile};
