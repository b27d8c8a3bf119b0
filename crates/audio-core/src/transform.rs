//! Chunk transform seam.

/// A stateful transform over a stream of interleaved 16-bit PCM chunks.
///
/// Implementations must return exactly as many samples as they were given;
/// chunks carry no identity, so all continuity lives in the transform.
pub trait ChunkTransform {
    fn process_chunk(&mut self, samples: &[i16]) -> Vec<i16>;
}
