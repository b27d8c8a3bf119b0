//! Face detector seam.
//!
//! Detection itself is an external concern: a session only consumes the
//! rectangles a detector reports for a grayscale frame. The crate ships a
//! replay adapter that feeds detections recorded in JSONL form (the
//! interchange format in `obscura-media-model`) back into a session.

use obscura_media_model::{FaceDetection, GrayFrame, PixelRect};

/// Produces face rectangles for a grayscale frame.
///
/// `stream_index` is the session's absolute position in the frame stream,
/// provided for detectors that correlate side-band data (recorded detection
/// streams, external detector processes). Order of the returned rectangles is
/// not significant; an empty result is the steady state, not an error.
pub trait FaceDetector {
    fn detect(&mut self, frame: &GrayFrame, stream_index: u64) -> Vec<PixelRect>;
}

/// Replays a recorded detection stream by frame index.
///
/// Records may arrive in any order; they are indexed once at construction.
pub struct ReplayDetector {
    detections: Vec<FaceDetection>,
}

impl ReplayDetector {
    pub fn new(mut detections: Vec<FaceDetection>) -> Self {
        detections.sort_by_key(|d| d.frame_index);
        Self { detections }
    }

    /// Number of recorded detections across all frames.
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

impl FaceDetector for ReplayDetector {
    fn detect(&mut self, _frame: &GrayFrame, stream_index: u64) -> Vec<PixelRect> {
        let start = self
            .detections
            .partition_point(|d| d.frame_index < stream_index);
        self.detections[start..]
            .iter()
            .take_while(|d| d.frame_index == stream_index)
            .map(|d| d.rect)
            .collect()
    }
}
