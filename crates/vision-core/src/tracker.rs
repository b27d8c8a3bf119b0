//! Tracker strategy seam and the built-in template tracker.
//!
//! A tracker strategy owns every live tracker in a session. The algorithm is
//! chosen once at session construction; the pool only ever talks to the
//! strategy through opaque [`TrackerId`] handles.

use std::collections::HashMap;

use obscura_media_model::{FrameBuf, PixelRect};

/// Opaque handle to one live tracker inside a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackerId(u64);

impl TrackerId {
    /// Build a handle from a raw counter value. Strategies mint handles;
    /// everything else treats them as opaque.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Per-object tracking algorithm.
///
/// `start` pins a tracker to an initial rectangle on the given frame.
/// `refine` asks it to re-locate that object on a new frame, returning `None`
/// on tracking failure. `stop` releases the handle; refining a stopped or
/// unknown handle is a failure, not a panic.
pub trait TrackerStrategy {
    fn start(&mut self, frame: &FrameBuf, bbox: PixelRect) -> TrackerId;
    fn refine(&mut self, id: TrackerId, frame: &FrameBuf) -> Option<PixelRect>;
    fn stop(&mut self, id: TrackerId);
}

/// Configuration for the built-in SAD template tracker.
#[derive(Debug, Clone)]
pub struct SadTrackerConfig {
    /// Maximum displacement searched per frame, in pixels.
    pub search_radius: i32,

    /// Coarse search stride in pixels; a stride-1 refinement runs around the
    /// best coarse hit.
    pub coarse_step: i32,

    /// Sampling stride inside the template when scoring a candidate.
    pub sample_step: u32,

    /// Mean per-channel absolute difference above which the match is
    /// rejected and the tracker reports failure.
    pub max_mean_error: f64,
}

impl Default for SadTrackerConfig {
    fn default() -> Self {
        Self {
            search_radius: 24,
            coarse_step: 4,
            sample_step: 4,
            max_mean_error: 28.0,
        }
    }
}

struct SadTrack {
    template: FrameBuf,
    bbox: PixelRect,
}

/// Sum-of-absolute-differences template tracker.
///
/// Remembers the pixel block it was started on and, each frame, searches a
/// bounded window around the last known position for the best-matching
/// placement of that block. The box never changes size; scale adaptation is
/// the detector's job via periodic re-detection.
pub struct SadTracker {
    config: SadTrackerConfig,
    next_id: u64,
    tracks: HashMap<TrackerId, SadTrack>,
}

impl SadTracker {
    pub fn new(config: SadTrackerConfig) -> Self {
        Self {
            config,
            next_id: 0,
            tracks: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(SadTrackerConfig::default())
    }

    /// Mean per-channel absolute difference between the template and the
    /// frame with the template's top-left corner placed at `(ox, oy)`.
    fn score_at(&self, template: &FrameBuf, frame: &FrameBuf, ox: i32, oy: i32) -> Option<f64> {
        let (tw, th) = template.dimensions();
        if ox < 0
            || oy < 0
            || ox + tw as i32 > frame.width() as i32
            || oy + th as i32 > frame.height() as i32
        {
            return None;
        }

        let step = self.config.sample_step.max(1);
        let mut total: u64 = 0;
        let mut count: u64 = 0;
        let mut y = 0;
        while y < th {
            let mut x = 0;
            while x < tw {
                let t = template.pixel(x, y);
                let f = frame.pixel(ox as u32 + x, oy as u32 + y);
                total += (t[0] as i32 - f[0] as i32).unsigned_abs() as u64
                    + (t[1] as i32 - f[1] as i32).unsigned_abs() as u64
                    + (t[2] as i32 - f[2] as i32).unsigned_abs() as u64;
                count += 3;
                x += step;
            }
            y += step;
        }

        (count > 0).then(|| total as f64 / count as f64)
    }

    /// Best placement within `radius` of `(cx, cy)` at the given stride.
    fn search(
        &self,
        template: &FrameBuf,
        frame: &FrameBuf,
        cx: i32,
        cy: i32,
        radius: i32,
        stride: i32,
    ) -> Option<(i32, i32, f64)> {
        let stride = stride.max(1);
        let mut best: Option<(i32, i32, f64)> = None;
        let mut dy = -radius;
        while dy <= radius {
            let mut dx = -radius;
            while dx <= radius {
                if let Some(score) = self.score_at(template, frame, cx + dx, cy + dy) {
                    if best.map_or(true, |(_, _, s)| score < s) {
                        best = Some((cx + dx, cy + dy, score));
                    }
                }
                dx += stride;
            }
            dy += stride;
        }
        best
    }
}

impl TrackerStrategy for SadTracker {
    fn start(&mut self, frame: &FrameBuf, bbox: PixelRect) -> TrackerId {
        let id = TrackerId(self.next_id);
        self.next_id += 1;

        let clamped = bbox.clamp_to(frame.width(), frame.height());
        let template = match frame.crop(clamped) {
            Ok(block) => block,
            // Degenerate init region: remember a 1x1 stub; the first refine
            // will fail the caller's geometry filter anyway.
            Err(_) => FrameBuf::new(1, 1),
        };
        self.tracks.insert(
            id,
            SadTrack {
                template,
                bbox: clamped,
            },
        );
        id
    }

    fn refine(&mut self, id: TrackerId, frame: &FrameBuf) -> Option<PixelRect> {
        let track = self.tracks.get(&id)?;
        let coarse = self.search(
            &track.template,
            frame,
            track.bbox.x,
            track.bbox.y,
            self.config.search_radius,
            self.config.coarse_step,
        )?;
        let (fx, fy, score) = self
            .search(
                &track.template,
                frame,
                coarse.0,
                coarse.1,
                self.config.coarse_step,
                1,
            )
            .unwrap_or(coarse);

        if score > self.config.max_mean_error {
            tracing::debug!(?id, score, "template match rejected");
            return None;
        }

        let refined = PixelRect::new(fx, fy, track.bbox.w, track.bbox.h);
        if let Some(track) = self.tracks.get_mut(&id) {
            track.bbox = refined;
        }
        Some(refined)
    }

    fn stop(&mut self, id: TrackerId) {
        self.tracks.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Frame with a bright square at `(x, y)` on a dark background.
    fn frame_with_square(w: u32, h: u32, x: u32, y: u32, side: u32) -> FrameBuf {
        let mut frame = FrameBuf::new(w, h);
        for row in y..(y + side).min(h) {
            for col in x..(x + side).min(w) {
                let i = ((row * w + col) * 3) as usize;
                frame.data_mut()[i] = 230;
                frame.data_mut()[i + 1] = 210;
                frame.data_mut()[i + 2] = 190;
            }
        }
        frame
    }

    #[test]
    fn test_tracker_follows_translation() {
        let mut tracker = SadTracker::with_defaults();
        let first = frame_with_square(320, 240, 100, 80, 60);
        let id = tracker.start(&first, PixelRect::new(100, 80, 60, 60));

        let moved = frame_with_square(320, 240, 110, 86, 60);
        let refined = tracker.refine(id, &moved).unwrap();
        assert_eq!(refined, PixelRect::new(110, 86, 60, 60));
    }

    #[test]
    fn test_tracker_fails_when_object_vanishes() {
        let mut tracker = SadTracker::with_defaults();
        let first = frame_with_square(320, 240, 100, 80, 60);
        let id = tracker.start(&first, PixelRect::new(100, 80, 60, 60));

        let blank = FrameBuf::new(320, 240);
        assert!(tracker.refine(id, &blank).is_none());
    }

    #[test]
    fn test_refine_after_stop_fails() {
        let mut tracker = SadTracker::with_defaults();
        let frame = frame_with_square(320, 240, 100, 80, 60);
        let id = tracker.start(&frame, PixelRect::new(100, 80, 60, 60));
        tracker.stop(id);
        assert!(tracker.refine(id, &frame).is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut tracker = SadTracker::with_defaults();
        let frame = frame_with_square(320, 240, 100, 80, 60);
        let a = tracker.start(&frame, PixelRect::new(100, 80, 60, 60));
        let b = tracker.start(&frame, PixelRect::new(100, 80, 60, 60));
        assert_ne!(a, b);
    }
}
