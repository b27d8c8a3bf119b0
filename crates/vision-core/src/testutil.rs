//! Scripted collaborators for unit tests.

use std::collections::HashMap;

use obscura_media_model::{FrameBuf, GrayFrame, PixelRect};

use crate::detector::FaceDetector;
use crate::tracker::{TrackerId, TrackerStrategy};

/// Detector returning a fixed set of rectangles on every call.
pub struct ScriptedDetector {
    rects: Vec<PixelRect>,
    calls: usize,
}

impl ScriptedDetector {
    pub fn always(rects: Vec<PixelRect>) -> Self {
        Self { rects, calls: 0 }
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl FaceDetector for ScriptedDetector {
    fn detect(&mut self, _frame: &GrayFrame, _stream_index: u64) -> Vec<PixelRect> {
        self.calls += 1;
        self.rects.clone()
    }
}

enum RefineMode {
    /// Return each handle's current rectangle unchanged.
    Follow,
    /// Report failure for every handle.
    Fail,
    /// Return this rectangle for every handle.
    Fixed(PixelRect),
}

/// Tracker whose refinement behavior is scripted by the test.
pub struct ScriptedTracker {
    tracks: HashMap<TrackerId, PixelRect>,
    next_id: u64,
    mode: RefineMode,
}

impl ScriptedTracker {
    /// A tracker that succeeds forever, reporting each region where it
    /// started.
    pub fn following() -> Self {
        Self {
            tracks: HashMap::new(),
            next_id: 0,
            mode: RefineMode::Follow,
        }
    }

    pub fn fail_all(&mut self) {
        self.mode = RefineMode::Fail;
    }

    pub fn recover(&mut self) {
        self.mode = RefineMode::Follow;
    }

    pub fn refine_with(&mut self, rect: PixelRect) {
        self.mode = RefineMode::Fixed(rect);
    }

    pub fn live_handles(&self) -> usize {
        self.tracks.len()
    }
}

impl TrackerStrategy for ScriptedTracker {
    fn start(&mut self, _frame: &FrameBuf, bbox: PixelRect) -> TrackerId {
        let id = TrackerId::from_raw(self.next_id);
        self.next_id += 1;
        self.tracks.insert(id, bbox);
        id
    }

    fn refine(&mut self, id: TrackerId, _frame: &FrameBuf) -> Option<PixelRect> {
        let current = self.tracks.get(&id).copied()?;
        match self.mode {
            RefineMode::Follow => Some(current),
            RefineMode::Fail => None,
            RefineMode::Fixed(rect) => {
                self.tracks.insert(id, rect);
                Some(rect)
            }
        }
    }

    fn stop(&mut self, id: TrackerId) {
        self.tracks.remove(&id);
    }
}
