//! Per-stream video session: the frame-by-frame driver.
//!
//! One `VideoSession` holds all mutable tracking state for one logical
//! stream. Sessions share nothing; concurrent streams each own their own
//! instance and cannot corrupt each other.

use obscura_media_model::FrameBuf;

use crate::blur::{blur_regions, BoxBlur, RegionBlur};
use crate::detector::FaceDetector;
use crate::guard::{FrameGuard, FrameSizeCheck};
use crate::pool::TrackerPool;
use crate::sink::{CropSink, NullCropSink};
use crate::tracker::TrackerStrategy;

pub use crate::pool::TrackingConfig;

/// What happened to a processed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameVerdict {
    /// The frame ran the full pipeline; `blurred` regions were obscured.
    Processed { blurred: usize },
    /// Frame dimensions changed: all tracking state was reset and the frame
    /// passed through untouched.
    Reset,
}

/// A face-blur session over one video stream.
pub struct VideoSession {
    config: TrackingConfig,
    guard: FrameGuard,
    pool: TrackerPool,
    detector: Box<dyn FaceDetector>,
    tracker: Box<dyn TrackerStrategy>,
    blur: Box<dyn RegionBlur>,
    crop_sink: Box<dyn CropSink>,
    /// Detection-cadence counter; resets when a new region is created.
    frame_counter: u64,
    /// Absolute frames consumed, including pass-through frames.
    stream_index: u64,
    crop_saved: bool,
}

impl VideoSession {
    /// Create a session with the given detector and tracker strategy.
    /// Blur defaults to [`BoxBlur`]; the diagnostic crop is discarded.
    pub fn new(
        config: TrackingConfig,
        detector: Box<dyn FaceDetector>,
        tracker: Box<dyn TrackerStrategy>,
    ) -> Self {
        Self {
            config,
            guard: FrameGuard::new(),
            pool: TrackerPool::new(),
            detector,
            tracker,
            blur: Box::new(BoxBlur::default()),
            crop_sink: Box::new(NullCropSink),
            frame_counter: 0,
            stream_index: 0,
            crop_saved: false,
        }
    }

    /// Replace the blur primitive.
    pub fn with_blur(mut self, blur: Box<dyn RegionBlur>) -> Self {
        self.blur = blur;
        self
    }

    /// Replace the diagnostic crop sink.
    pub fn with_crop_sink(mut self, sink: Box<dyn CropSink>) -> Self {
        self.crop_sink = sink;
        self
    }

    /// Number of regions currently tracked.
    pub fn tracked_regions(&self) -> usize {
        self.pool.len()
    }

    /// Absolute frames consumed so far.
    pub fn frames_processed(&self) -> u64 {
        self.stream_index
    }

    /// Run one frame through the pipeline, blurring surviving face regions
    /// in place.
    ///
    /// Sequence: dimension guard, then detection/reconciliation, then
    /// tracker update, then the one-shot diagnostic crop, then blur. On a
    /// dimension change the pool is cleared and the frame returned untouched.
    pub fn process_frame(&mut self, frame: &mut FrameBuf) -> FrameVerdict {
        let (width, height) = frame.dimensions();
        if self.guard.check(width, height) == FrameSizeCheck::Changed {
            self.pool.clear(self.tracker.as_mut());
            self.frame_counter = 0;
            self.stream_index += 1;
            return FrameVerdict::Reset;
        }

        self.frame_counter += 1;
        let gray = frame.to_gray();
        self.pool.reconcile(
            frame,
            &gray,
            self.stream_index,
            &mut self.frame_counter,
            self.detector.as_mut(),
            self.tracker.as_mut(),
            &self.config,
        );
        self.stream_index += 1;

        let survivors = self
            .pool
            .advance(frame, self.tracker.as_mut(), &self.config);

        // One-shot diagnostic: the first region ever to survive a full frame
        // gets its (pre-blur) crop saved. Fire-and-forget; the latch is set
        // even if the sink fails so it cannot fire twice.
        if !self.crop_saved {
            if let Some(&(id, bbox)) = survivors.first() {
                self.crop_saved = true;
                match frame.crop(bbox) {
                    Ok(crop) => {
                        if let Err(e) = self.crop_sink.save(&crop) {
                            tracing::warn!(region = ?id, error = %e, "diagnostic crop failed");
                        }
                    }
                    Err(e) => {
                        tracing::warn!(region = ?id, error = %e, "diagnostic crop failed");
                    }
                }
            }
        }

        let rects: Vec<_> = survivors.iter().map(|&(_, bbox)| bbox).collect();
        let blurred = blur_regions(frame, &rects, self.blur.as_ref());
        FrameVerdict::Processed { blurred }
    }
}
