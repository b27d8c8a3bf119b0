//! Tracked face regions and their per-frame lifecycle.
//!
//! The pool owns every [`FaceRegion`] of one session in a stable-id arena:
//! region ids never move, dead entries become tombstones, and the table is
//! compacted once tombstones dominate. Iteration preserves insertion
//! (detection) order.

use obscura_media_model::{FrameBuf, GrayFrame, PixelRect};

use crate::detector::FaceDetector;
use crate::tracker::{TrackerId, TrackerStrategy};

/// Stable identifier of a region within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionId(u64);

/// Lifecycle state of a tracked region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionState {
    /// Tracked and eligible for blurring.
    Active,
    /// Tracker lost the object; retained only within the configured grace.
    Lost,
}

/// One tracked face region.
#[derive(Debug, Clone)]
pub struct FaceRegion {
    pub id: RegionId,
    pub bbox: PixelRect,
    pub tracker: TrackerId,
    pub state: RegionState,
    pub frames_since_lost: u32,
}

/// Tracking behavior knobs. Defaults suit a 640x480 webcam stream.
#[derive(Debug, Clone)]
pub struct TrackingConfig {
    /// Frame cadence at which fresh detection re-runs even while tracking.
    pub detection_interval: u64,

    /// Proximity threshold in pixels: a detection within this distance of an
    /// Active region (on all four of x, y, w, h) is a duplicate.
    pub proximity_px: i32,

    /// Minimum post-clamp width and height for a region to survive a frame.
    pub min_region_px: i32,

    /// Exclusive width/height ratio band a surviving region must fall in.
    pub aspect_band: (f64, f64),

    /// How many frames a Lost region is retained and retried before removal.
    /// Zero drops a region the same frame its tracker fails.
    pub lost_grace_frames: u32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            detection_interval: 30,
            proximity_px: 50,
            min_region_px: 40,
            aspect_band: (0.7, 1.3),
            lost_grace_frames: 0,
        }
    }
}

impl TrackingConfig {
    /// Post-clamp geometry filter: minimum size and aspect band.
    pub fn geometry_ok(&self, rect: &PixelRect) -> bool {
        let ratio = rect.aspect_ratio();
        rect.w > self.min_region_px
            && rect.h > self.min_region_px
            && ratio > self.aspect_band.0
            && ratio < self.aspect_band.1
    }
}

/// The set of face regions currently tracked by one session.
#[derive(Default)]
pub struct TrackerPool {
    slots: Vec<Option<FaceRegion>>,
    next_id: u64,
    live: usize,
}

impl TrackerPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of regions currently in the pool (Active or in-grace Lost).
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterate regions in insertion order.
    pub fn regions(&self) -> impl Iterator<Item = &FaceRegion> {
        self.slots.iter().flatten()
    }

    /// Whether any region is currently Active.
    pub fn any_active(&self) -> bool {
        self.regions().any(|r| r.state == RegionState::Active)
    }

    /// Remove every region, releasing its tracker.
    pub fn clear(&mut self, tracker: &mut dyn TrackerStrategy) {
        for slot in self.slots.drain(..) {
            if let Some(region) = slot {
                tracker.stop(region.tracker);
            }
        }
        self.live = 0;
    }

    /// Reconcile fresh detections against the pool.
    ///
    /// Detection runs when no region is Active or when `frame_counter` hits
    /// the detection interval. Each raw rectangle is discarded if it
    /// proximity-matches an Active region; otherwise a tracker is started on
    /// this frame and a new Active region appended. Creating a region resets
    /// `frame_counter` to zero.
    #[allow(clippy::too_many_arguments)]
    pub fn reconcile(
        &mut self,
        frame: &FrameBuf,
        gray: &GrayFrame,
        stream_index: u64,
        frame_counter: &mut u64,
        detector: &mut dyn FaceDetector,
        tracker: &mut dyn TrackerStrategy,
        config: &TrackingConfig,
    ) {
        let interval = config.detection_interval.max(1);
        let due = !self.any_active() || *frame_counter % interval == 0;
        if !due {
            return;
        }

        let detections = detector.detect(gray, stream_index);
        for bbox in detections {
            let duplicate = self.regions().any(|region| {
                region.state == RegionState::Active
                    && bbox.is_near(&region.bbox, config.proximity_px)
            });
            if duplicate {
                continue;
            }

            let handle = tracker.start(frame, bbox);
            let id = RegionId(self.next_id);
            self.next_id += 1;
            self.slots.push(Some(FaceRegion {
                id,
                bbox,
                tracker: handle,
                state: RegionState::Active,
                frames_since_lost: 0,
            }));
            self.live += 1;
            *frame_counter = 0;
            tracing::debug!(region = id.0, ?bbox, "new face region");
        }
    }

    /// Advance every region one frame against its tracker.
    ///
    /// A region survives iff its tracker refines successfully and the
    /// clamped rectangle passes the geometry filter; it is then Active with
    /// its bbox updated. Otherwise it flips to Lost and is removed once it
    /// has been lost for more than `lost_grace_frames` frames.
    ///
    /// Returns the surviving regions' `(id, bbox)` in insertion order.
    pub fn advance(
        &mut self,
        frame: &FrameBuf,
        tracker: &mut dyn TrackerStrategy,
        config: &TrackingConfig,
    ) -> Vec<(RegionId, PixelRect)> {
        let (width, height) = frame.dimensions();
        let mut survivors = Vec::new();

        for slot in self.slots.iter_mut() {
            let Some(region) = slot else { continue };

            let refined = tracker
                .refine(region.tracker, frame)
                .map(|bbox| bbox.clamp_to(width, height))
                .filter(|bbox| config.geometry_ok(bbox));

            match refined {
                Some(bbox) => {
                    region.bbox = bbox;
                    region.state = RegionState::Active;
                    region.frames_since_lost = 0;
                    survivors.push((region.id, bbox));
                }
                None => {
                    region.state = RegionState::Lost;
                    region.frames_since_lost += 1;
                    if region.frames_since_lost > config.lost_grace_frames {
                        tracing::debug!(
                            region = region.id.0,
                            lost_frames = region.frames_since_lost,
                            "dropping region"
                        );
                        tracker.stop(region.tracker);
                        *slot = None;
                        self.live -= 1;
                    }
                }
            }
        }

        self.maybe_compact();
        survivors
    }

    /// Drop tombstones once they outnumber live entries.
    fn maybe_compact(&mut self) {
        if self.slots.len() >= 8 && self.live * 2 < self.slots.len() {
            self.slots.retain(Option::is_some);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{ScriptedDetector, ScriptedTracker};

    fn frame() -> FrameBuf {
        FrameBuf::new(640, 480)
    }

    fn run_reconcile(
        pool: &mut TrackerPool,
        detector: &mut ScriptedDetector,
        tracker: &mut ScriptedTracker,
        frame_counter: &mut u64,
        stream_index: u64,
    ) {
        let f = frame();
        let gray = f.to_gray();
        pool.reconcile(
            &f,
            &gray,
            stream_index,
            frame_counter,
            detector,
            tracker,
            &TrackingConfig::default(),
        );
    }

    #[test]
    fn test_detection_creates_region_and_resets_counter() {
        let mut pool = TrackerPool::new();
        let mut detector = ScriptedDetector::always(vec![PixelRect::new(10, 10, 60, 60)]);
        let mut tracker = ScriptedTracker::following();
        let mut counter = 7;

        run_reconcile(&mut pool, &mut detector, &mut tracker, &mut counter, 0);

        assert_eq!(pool.len(), 1);
        assert_eq!(counter, 0);
        assert!(pool.any_active());
    }

    #[test]
    fn test_proximity_duplicate_is_discarded() {
        let mut pool = TrackerPool::new();
        let mut tracker = ScriptedTracker::following();
        let mut counter = 0;

        let mut first = ScriptedDetector::always(vec![PixelRect::new(100, 100, 80, 80)]);
        run_reconcile(&mut pool, &mut first, &mut tracker, &mut counter, 0);
        assert_eq!(pool.len(), 1);

        // All four deltas below 50: same physical face.
        let mut near = ScriptedDetector::always(vec![PixelRect::new(130, 120, 60, 100)]);
        counter = 0;
        run_reconcile(&mut pool, &mut near, &mut tracker, &mut counter, 1);
        assert_eq!(pool.len(), 1);

        // One delta at 50: a different face.
        let mut far = ScriptedDetector::always(vec![PixelRect::new(150, 100, 80, 80)]);
        counter = 0;
        run_reconcile(&mut pool, &mut far, &mut tracker, &mut counter, 2);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_dedup_invariant_holds_over_noisy_detections() {
        let mut pool = TrackerPool::new();
        let mut tracker = ScriptedTracker::following();
        let config = TrackingConfig::default();

        // Jittered re-detections of two faces over many cycles.
        for i in 0..20 {
            let jitter = (i % 5) as i32;
            let mut detector = ScriptedDetector::always(vec![
                PixelRect::new(100 + jitter, 100, 80, 80),
                PixelRect::new(400, 200 + jitter, 90, 90),
            ]);
            let mut counter = 0;
            run_reconcile(&mut pool, &mut detector, &mut tracker, &mut counter, i);
        }

        let active: Vec<&FaceRegion> = pool
            .regions()
            .filter(|r| r.state == RegionState::Active)
            .collect();
        assert_eq!(active.len(), 2);
        for (i, a) in active.iter().enumerate() {
            for b in active.iter().skip(i + 1) {
                assert!(!a.bbox.is_near(&b.bbox, config.proximity_px));
            }
        }
    }

    #[test]
    fn test_no_detection_cycle_when_tracking_and_off_interval() {
        let mut pool = TrackerPool::new();
        let mut tracker = ScriptedTracker::following();
        let mut counter = 0;

        let mut detector = ScriptedDetector::always(vec![PixelRect::new(10, 10, 60, 60)]);
        run_reconcile(&mut pool, &mut detector, &mut tracker, &mut counter, 0);
        assert_eq!(detector.calls(), 1);

        // Counter off-interval and a region Active: detector must not run.
        counter = 17;
        run_reconcile(&mut pool, &mut detector, &mut tracker, &mut counter, 1);
        assert_eq!(detector.calls(), 1);

        // On the interval boundary it runs again.
        counter = 30;
        run_reconcile(&mut pool, &mut detector, &mut tracker, &mut counter, 2);
        assert_eq!(detector.calls(), 2);
    }

    #[test]
    fn test_advance_drops_failed_tracker_same_frame() {
        let mut pool = TrackerPool::new();
        let mut detector = ScriptedDetector::always(vec![PixelRect::new(10, 10, 60, 60)]);
        let mut tracker = ScriptedTracker::following();
        let mut counter = 0;
        run_reconcile(&mut pool, &mut detector, &mut tracker, &mut counter, 0);

        tracker.fail_all();
        let survivors = pool.advance(&frame(), &mut tracker, &TrackingConfig::default());
        assert!(survivors.is_empty());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_advance_applies_size_and_aspect_filter() {
        let config = TrackingConfig::default();
        let cases = [
            // (refined rect, survives)
            (PixelRect::new(10, 10, 60, 60), true),
            (PixelRect::new(10, 10, 30, 30), false), // too small
            (PixelRect::new(10, 10, 60, 40), false), // short side at minimum
            (PixelRect::new(10, 10, 90, 60), false), // ratio 1.5
            (PixelRect::new(10, 10, 41, 51), true),  // ratio ~0.8
        ];

        for (rect, survives) in cases {
            let mut pool = TrackerPool::new();
            let mut detector = ScriptedDetector::always(vec![PixelRect::new(10, 10, 60, 60)]);
            let mut tracker = ScriptedTracker::following();
            let mut counter = 0;
            run_reconcile(&mut pool, &mut detector, &mut tracker, &mut counter, 0);

            tracker.refine_with(rect);
            let survivors = pool.advance(&frame(), &mut tracker, &config);
            assert_eq!(survivors.len(), usize::from(survives), "case {rect:?}");
            assert_eq!(pool.len(), usize::from(survives), "case {rect:?}");
        }
    }

    #[test]
    fn test_advance_clamps_before_filtering() {
        let mut pool = TrackerPool::new();
        let mut detector = ScriptedDetector::always(vec![PixelRect::new(10, 10, 60, 60)]);
        let mut tracker = ScriptedTracker::following();
        let mut counter = 0;
        run_reconcile(&mut pool, &mut detector, &mut tracker, &mut counter, 0);

        // Overhangs the right edge of the 640x480 frame; the raw 60x60 box
        // passes the filter but the post-clamp width of 40 does not.
        tracker.refine_with(PixelRect::new(600, 100, 60, 60));
        let survivors = pool.advance(&frame(), &mut tracker, &TrackingConfig::default());
        assert_eq!(survivors, vec![]);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_lost_grace_retains_and_recovers_region() {
        let config = TrackingConfig {
            lost_grace_frames: 2,
            ..Default::default()
        };
        let mut pool = TrackerPool::new();
        let mut detector = ScriptedDetector::always(vec![PixelRect::new(10, 10, 60, 60)]);
        let mut tracker = ScriptedTracker::following();
        let mut counter = 0;
        run_reconcile(&mut pool, &mut detector, &mut tracker, &mut counter, 0);

        tracker.fail_all();
        assert!(pool.advance(&frame(), &mut tracker, &config).is_empty());
        assert_eq!(pool.len(), 1); // lost frame 1, retained
        assert!(!pool.any_active());

        tracker.recover();
        let survivors = pool.advance(&frame(), &mut tracker, &config);
        assert_eq!(survivors.len(), 1);
        assert!(pool.any_active());
        assert_eq!(pool.regions().next().unwrap().frames_since_lost, 0);
    }

    #[test]
    fn test_lost_grace_expires() {
        let config = TrackingConfig {
            lost_grace_frames: 2,
            ..Default::default()
        };
        let mut pool = TrackerPool::new();
        let mut detector = ScriptedDetector::always(vec![PixelRect::new(10, 10, 60, 60)]);
        let mut tracker = ScriptedTracker::following();
        let mut counter = 0;
        run_reconcile(&mut pool, &mut detector, &mut tracker, &mut counter, 0);

        tracker.fail_all();
        pool.advance(&frame(), &mut tracker, &config);
        pool.advance(&frame(), &mut tracker, &config);
        assert_eq!(pool.len(), 1);
        pool.advance(&frame(), &mut tracker, &config);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_clear_releases_trackers() {
        let mut pool = TrackerPool::new();
        let mut detector = ScriptedDetector::always(vec![
            PixelRect::new(10, 10, 60, 60),
            PixelRect::new(200, 10, 60, 60),
        ]);
        let mut tracker = ScriptedTracker::following();
        let mut counter = 0;
        run_reconcile(&mut pool, &mut detector, &mut tracker, &mut counter, 0);
        assert_eq!(tracker.live_handles(), 2);

        pool.clear(&mut tracker);
        assert!(pool.is_empty());
        assert_eq!(tracker.live_handles(), 0);
    }
}
