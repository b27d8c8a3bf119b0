//! Frame-dimension guard.
//!
//! A stream may change resolution mid-flight (source renegotiation, device
//! switch). Every tracked rectangle is expressed in pixels of the old
//! geometry, so a dimension change invalidates the whole pool.

/// Result of a per-frame dimension check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSizeCheck {
    /// Dimensions match the recorded expectation (or this is the first frame).
    Unchanged,
    /// Dimensions differ; all tracking state must be reset and the current
    /// frame passed through untouched.
    Changed,
}

/// Tracks the expected frame dimensions of one stream.
#[derive(Debug, Default)]
pub struct FrameGuard {
    expected: Option<(u32, u32)>,
}

impl FrameGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check an incoming frame's dimensions against the expectation.
    ///
    /// The first call records the dimensions and reports `Unchanged`. A
    /// mismatch records the new dimensions and reports `Changed`.
    pub fn check(&mut self, width: u32, height: u32) -> FrameSizeCheck {
        match self.expected {
            None => {
                self.expected = Some((width, height));
                FrameSizeCheck::Unchanged
            }
            Some(expected) if expected == (width, height) => FrameSizeCheck::Unchanged,
            Some(expected) => {
                tracing::warn!(
                    from = ?expected,
                    to = ?(width, height),
                    "frame size changed, resetting trackers"
                );
                self.expected = Some((width, height));
                FrameSizeCheck::Changed
            }
        }
    }

    /// The currently expected dimensions, if any frame has been seen.
    pub fn expected(&self) -> Option<(u32, u32)> {
        self.expected
    }
}
