//! Minimal RIFF/WAVE container handling and the whole-file scramble.
//!
//! Only canonical 16-bit PCM is accepted; anything else is rejected at this
//! boundary rather than passed through half-understood. Unknown chunks are
//! skipped, and the encoder writes the classic 44-byte header layout.

use obscura_common::{ObscuraError, ObscuraResult};
use obscura_media_model::AudioFormat;

use crate::transform::ChunkTransform;

/// WAVE format tag for uncompressed PCM.
const FORMAT_PCM: u16 = 1;

/// A decoded 16-bit PCM WAV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavFile {
    pub format: AudioFormat,
    /// Interleaved samples.
    pub samples: Vec<i16>,
}

impl WavFile {
    pub fn new(format: AudioFormat, samples: Vec<i16>) -> Self {
        Self { format, samples }
    }

    /// Decode a RIFF/WAVE byte stream.
    ///
    /// Rejects anything that is not canonical 16-bit PCM: bad magic,
    /// non-PCM format tags, other bit depths, or a missing data chunk.
    pub fn decode(bytes: &[u8]) -> ObscuraResult<Self> {
        if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
            return Err(ObscuraError::invalid_input("not a RIFF/WAVE stream"));
        }

        let mut format: Option<AudioFormat> = None;
        let mut samples: Option<Vec<i16>> = None;
        let mut offset = 12;

        while offset + 8 <= bytes.len() {
            let id = &bytes[offset..offset + 4];
            let size = u32::from_le_bytes([
                bytes[offset + 4],
                bytes[offset + 5],
                bytes[offset + 6],
                bytes[offset + 7],
            ]) as usize;
            let body_start = offset + 8;
            let body_end = body_start
                .checked_add(size)
                .filter(|&end| end <= bytes.len())
                .ok_or_else(|| ObscuraError::invalid_input("truncated WAVE chunk"))?;
            let body = &bytes[body_start..body_end];

            match id {
                b"fmt " => format = Some(parse_fmt_chunk(body)?),
                b"data" => {
                    if body.len() % 2 != 0 {
                        return Err(ObscuraError::invalid_input(
                            "data chunk is not whole 16-bit samples",
                        ));
                    }
                    samples = Some(
                        body.chunks_exact(2)
                            .map(|b| i16::from_le_bytes([b[0], b[1]]))
                            .collect(),
                    );
                }
                _ => {}
            }

            // Chunks are word-aligned; odd sizes carry a pad byte.
            offset = body_end + (size & 1);
        }

        match (format, samples) {
            (Some(format), Some(samples)) => Ok(Self { format, samples }),
            (None, _) => Err(ObscuraError::invalid_input("missing fmt chunk")),
            (_, None) => Err(ObscuraError::invalid_input("missing data chunk")),
        }
    }

    /// Encode back to a RIFF/WAVE byte stream, preserving the source's
    /// channel count, sample width, and frame rate.
    pub fn encode(&self) -> Vec<u8> {
        let data_size = (self.samples.len() * 2) as u32;
        let file_size = 36 + data_size;

        let mut wav = Vec::with_capacity(44 + self.samples.len() * 2);

        // RIFF header
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&file_size.to_le_bytes());
        wav.extend_from_slice(b"WAVE");

        // fmt chunk
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&FORMAT_PCM.to_le_bytes());
        wav.extend_from_slice(&self.format.channels.to_le_bytes());
        wav.extend_from_slice(&self.format.sample_rate.to_le_bytes());
        wav.extend_from_slice(&self.format.byte_rate().to_le_bytes());
        wav.extend_from_slice(&self.format.block_align().to_le_bytes());
        wav.extend_from_slice(&16u16.to_le_bytes());

        // data chunk
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&data_size.to_le_bytes());
        for sample in &self.samples {
            wav.extend_from_slice(&sample.to_le_bytes());
        }

        wav
    }
}

fn parse_fmt_chunk(body: &[u8]) -> ObscuraResult<AudioFormat> {
    if body.len() < 16 {
        return Err(ObscuraError::invalid_input("fmt chunk too short"));
    }
    let format_tag = u16::from_le_bytes([body[0], body[1]]);
    let channels = u16::from_le_bytes([body[2], body[3]]);
    let sample_rate = u32::from_le_bytes([body[4], body[5], body[6], body[7]]);
    let bits_per_sample = u16::from_le_bytes([body[14], body[15]]);

    if format_tag != FORMAT_PCM {
        return Err(ObscuraError::unsupported(format!(
            "WAVE format tag {format_tag} (only PCM is handled)"
        )));
    }
    if bits_per_sample != 16 {
        return Err(ObscuraError::unsupported(format!(
            "{bits_per_sample}-bit samples (only 16-bit is handled)"
        )));
    }
    if channels == 0 {
        return Err(ObscuraError::invalid_input("zero channels"));
    }

    Ok(AudioFormat::new(sample_rate, channels))
}

/// Scramble a whole file through a chunk transform.
///
/// The sample stream is segmented into chunks of `chunk_frames` frames; the
/// final partial chunk, if any, is processed at its natural shorter length.
/// The output container keeps the input's format parameters.
pub fn scramble_wav(
    wav: &WavFile,
    chunk_frames: usize,
    transform: &mut dyn ChunkTransform,
) -> WavFile {
    let chunk_samples = wav.format.samples_per_chunk(chunk_frames).max(1);
    let mut samples = Vec::with_capacity(wav.samples.len());
    for chunk in wav.samples.chunks(chunk_samples) {
        samples.extend(transform.process_chunk(chunk));
    }

    tracing::debug!(
        chunks = wav.samples.len().div_ceil(chunk_samples),
        samples = samples.len(),
        "scrambled audio stream"
    );
    WavFile {
        format: wav.format,
        samples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modulator::{PitchConfig, PitchModulator};

    fn stereo_fixture(n_samples: usize) -> WavFile {
        let samples = (0..n_samples).map(|i| (i % 311) as i16 - 155).collect();
        WavFile::new(AudioFormat::new(48_000, 2), samples)
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let wav = stereo_fixture(4096);
        let decoded = WavFile::decode(&wav.encode()).unwrap();
        assert_eq!(decoded, wav);
    }

    #[test]
    fn test_decode_rejects_bad_magic() {
        assert!(WavFile::decode(b"OggS....").is_err());
        assert!(WavFile::decode(&[]).is_err());
    }

    #[test]
    fn test_decode_rejects_non_pcm() {
        let mut bytes = stereo_fixture(64).encode();
        // Patch the format tag to IEEE float (3).
        bytes[20] = 3;
        assert!(matches!(
            WavFile::decode(&bytes),
            Err(obscura_common::ObscuraError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_wrong_bit_depth() {
        let mut bytes = stereo_fixture(64).encode();
        // Patch bits-per-sample to 8.
        bytes[34] = 8;
        assert!(matches!(
            WavFile::decode(&bytes),
            Err(obscura_common::ObscuraError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_truncated_data() {
        let mut bytes = stereo_fixture(64).encode();
        bytes.truncate(bytes.len() - 10);
        assert!(WavFile::decode(&bytes).is_err());
    }

    #[test]
    fn test_decode_skips_unknown_chunks() {
        let wav = stereo_fixture(32);
        let encoded = wav.encode();

        // Insert a LIST chunk between fmt and data (offset 36).
        let mut bytes = encoded[..36].to_vec();
        bytes.extend_from_slice(b"LIST");
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes.extend_from_slice(b"INFO");
        bytes.extend_from_slice(&encoded[36..]);

        let decoded = WavFile::decode(&bytes).unwrap();
        assert_eq!(decoded.samples, wav.samples);
    }

    #[test]
    fn test_scramble_preserves_length_and_format() {
        // 3000 stereo samples: one full 2048-sample chunk plus a 952-sample
        // partial tail.
        let wav = stereo_fixture(3000);
        let mut modulator = PitchModulator::with_seed(PitchConfig::default(), 17);

        let scrambled = scramble_wav(&wav, 1024, &mut modulator);
        assert_eq!(scrambled.samples.len(), 3000);
        assert_eq!(scrambled.format, wav.format);
        assert_eq!(modulator.chunks_processed(), 2);
    }

    #[test]
    fn test_scramble_identity_factor_is_lossless() {
        let wav = stereo_fixture(4096);
        let config = PitchConfig {
            initial_factor: Some(1.0),
            ..Default::default()
        };
        let mut modulator = PitchModulator::with_seed(config, 1);

        let scrambled = scramble_wav(&wav, 1024, &mut modulator);
        assert_eq!(scrambled, wav);
    }
}
