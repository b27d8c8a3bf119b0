//! Scramble a voice recording.

use std::path::PathBuf;

use obscura_audio_core::{
    scramble_wav, ChunkTransform, NoiseConfig, NoiseScrambler, PitchConfig, PitchModulator,
    WavFile,
};

#[allow(clippy::too_many_arguments)]
pub fn run(
    input: PathBuf,
    out: Option<PathBuf>,
    chunk_frames: usize,
    robotic_step: Option<f64>,
    distortion: Option<f64>,
    noise: bool,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let bytes = std::fs::read(&input)
        .map_err(|_| anyhow::anyhow!("Input file not found: {}", input.display()))?;
    let wav = WavFile::decode(&bytes)
        .map_err(|e| anyhow::anyhow!("Rejecting {}: {e}", input.display()))?;
    println!(
        "Loaded {} samples ({} Hz, {} channel(s))",
        wav.samples.len(),
        wav.format.sample_rate,
        wav.format.channels
    );

    let mut transform: Box<dyn ChunkTransform> = if noise {
        let config = NoiseConfig::default();
        match seed {
            Some(seed) => Box::new(NoiseScrambler::with_seed(config, seed)),
            None => Box::new(NoiseScrambler::new(config)),
        }
    } else {
        let config = PitchConfig {
            robotic_step,
            distortion_level: distortion,
            ..Default::default()
        };
        match seed {
            Some(seed) => Box::new(PitchModulator::with_seed(config, seed)),
            None => Box::new(PitchModulator::new(config)),
        }
    };

    let scrambled = scramble_wav(&wav, chunk_frames, transform.as_mut());

    let out_path = out.unwrap_or_else(|| default_out_path(&input));
    std::fs::write(&out_path, scrambled.encode())
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", out_path.display()))?;

    println!("Scrambled audio saved to {}", out_path.display());
    Ok(())
}

/// `scrambled_<name>` next to the input.
fn default_out_path(input: &PathBuf) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "recording.wav".to_string());
    input.with_file_name(format!("scrambled_{name}"))
}
