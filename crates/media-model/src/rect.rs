//! Pixel-space rectangle type used for face regions.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in pixel coordinates.
///
/// `(x, y)` is the top-left corner. Coordinates are signed so that raw
/// detector output extending past the frame edge can be represented before
/// clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    /// Left edge in pixels.
    pub x: i32,
    /// Top edge in pixels.
    pub y: i32,
    /// Width in pixels.
    pub w: i32,
    /// Height in pixels.
    pub h: i32,
}

impl PixelRect {
    /// Create a new rectangle.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Create a rectangle from corner coordinates (left, top, right, bottom).
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x: x1,
            y: y1,
            w: x2 - x1,
            h: y2 - y1,
        }
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Area in pixels. Zero for degenerate rectangles.
    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.w as i64 * self.h as i64
        }
    }

    /// Whether the rectangle has no interior.
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Width-to-height ratio. Zero-height rectangles report an infinite ratio
    /// so they always fail a band check.
    pub fn aspect_ratio(&self) -> f64 {
        if self.h == 0 {
            f64::INFINITY
        } else {
            self.w as f64 / self.h as f64
        }
    }

    /// Clamp the rectangle into a `frame_w x frame_h` frame: the origin is
    /// floored at zero and the extent is capped so the box stays inside.
    pub fn clamp_to(&self, frame_w: u32, frame_h: u32) -> PixelRect {
        let x = self.x.max(0);
        let y = self.y.max(0);
        let w = self.w.min(frame_w as i32 - x);
        let h = self.h.min(frame_h as i32 - y);
        PixelRect { x, y, w, h }
    }

    /// Proximity match: two rectangles are considered the same physical
    /// object when all four of |Δx|, |Δy|, |Δw|, |Δh| fall below `threshold`.
    pub fn is_near(&self, other: &PixelRect, threshold: i32) -> bool {
        (self.x - other.x).abs() < threshold
            && (self.y - other.y).abs() < threshold
            && (self.w - other.w).abs() < threshold
            && (self.h - other.h).abs() < threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners() {
        let r = PixelRect::from_corners(10, 20, 110, 140);
        assert_eq!(r, PixelRect::new(10, 20, 100, 120));
        assert_eq!(r.right(), 110);
        assert_eq!(r.bottom(), 140);
    }

    #[test]
    fn test_clamp_to_inside_is_identity() {
        let r = PixelRect::new(10, 10, 50, 50);
        assert_eq!(r.clamp_to(640, 480), r);
    }

    #[test]
    fn test_clamp_to_negative_origin() {
        let r = PixelRect::new(-20, -5, 100, 100);
        let clamped = r.clamp_to(640, 480);
        assert_eq!(clamped.x, 0);
        assert_eq!(clamped.y, 0);
        // Extent is capped against the clamped origin, not shifted.
        assert_eq!(clamped.w, 100);
        assert_eq!(clamped.h, 100);
    }

    #[test]
    fn test_clamp_to_overhanging_edge() {
        let r = PixelRect::new(600, 450, 100, 100);
        let clamped = r.clamp_to(640, 480);
        assert_eq!(clamped.right(), 640);
        assert_eq!(clamped.bottom(), 480);
    }

    #[test]
    fn test_clamp_can_produce_empty_rect() {
        let r = PixelRect::new(700, 10, 50, 50);
        assert!(r.clamp_to(640, 480).is_empty());
    }

    #[test]
    fn test_proximity_match() {
        let a = PixelRect::new(100, 100, 80, 80);
        let b = PixelRect::new(140, 120, 60, 100);
        assert!(a.is_near(&b, 50));

        // A single delta at the threshold breaks the match.
        let c = PixelRect::new(150, 100, 80, 80);
        assert!(!a.is_near(&c, 50));
    }

    #[test]
    fn test_aspect_ratio() {
        let r = PixelRect::new(0, 0, 120, 100);
        assert!((r.aspect_ratio() - 1.2).abs() < 1e-9);
        assert!(PixelRect::new(0, 0, 10, 0).aspect_ratio().is_infinite());
    }

    #[test]
    fn test_serde_roundtrip() {
        let r = PixelRect::new(10, 10, 30, 30);
        let json = serde_json::to_string(&r).unwrap();
        let parsed: PixelRect = serde_json::from_str(&json).unwrap();
        assert_eq!(r, parsed);
    }
}
