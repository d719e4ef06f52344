use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in frame pixel coordinates.
///
/// Corners are stored as (x1, y1) top-left and (x2, y2) bottom-right. A rect
/// whose corners have collapsed (x1 >= x2 or y1 >= y2) is *degenerate*: a
/// valid, expected outcome of clamping that signals "skip this detection",
/// never an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PixelRect {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl PixelRect {
    /// Create a new rectangle from corner coordinates.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Clamp every coordinate to the frame extents [0, width] x [0, height].
    ///
    /// Never fails; the result may be degenerate.
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let w = width as f32;
        let h = height as f32;
        Self {
            x1: self.x1.clamp(0.0, w),
            y1: self.y1.clamp(0.0, h),
            x2: self.x2.clamp(0.0, w),
            y2: self.y2.clamp(0.0, h),
        }
    }

    /// True when the rectangle encloses no pixels.
    pub fn is_degenerate(&self) -> bool {
        self.x1 >= self.x2 || self.y1 >= self.y2
    }

    /// Width in pixels.
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    /// Height in pixels.
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Area in square pixels (zero for degenerate rects).
    pub fn area(&self) -> f32 {
        if self.is_degenerate() {
            0.0
        } else {
            self.width() * self.height()
        }
    }
}

/// A candidate bounding rectangle produced by the object detector.
///
/// The confidence is reported by the detector but intentionally unused by the
/// downstream classify-and-draw path: every detection is classified.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub rect: PixelRect,
    pub confidence: f32,
}

impl Detection {
    pub fn new(rect: PixelRect, confidence: f32) -> Self {
        Self { rect, confidence }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_keeps_inside_rect_unchanged() {
        let r = PixelRect::new(10.0, 20.0, 100.0, 200.0);
        assert_eq!(r.clamp_to(640, 480), r);
    }

    #[test]
    fn clamp_bounds_all_coordinates() {
        let r = PixelRect::new(-50.0, -10.0, 700.0, 500.0).clamp_to(640, 480);
        assert_eq!(r, PixelRect::new(0.0, 0.0, 640.0, 480.0));
        assert!(!r.is_degenerate());
    }

    #[test]
    fn clamp_never_produces_out_of_range_values() {
        let cases = [
            PixelRect::new(-1e6, -1e6, 1e6, 1e6),
            PixelRect::new(300.0, 100.0, 200.0, 50.0),
            PixelRect::new(f32::NEG_INFINITY, 0.0, f32::INFINITY, 10.0),
        ];
        for r in cases {
            let c = r.clamp_to(320, 240);
            assert!(c.x1 >= 0.0 && c.x1 <= 320.0);
            assert!(c.x2 >= 0.0 && c.x2 <= 320.0);
            assert!(c.y1 >= 0.0 && c.y1 <= 240.0);
            assert!(c.y2 >= 0.0 && c.y2 <= 240.0);
        }
    }

    #[test]
    fn fully_outside_rect_clamps_to_degenerate() {
        let r = PixelRect::new(700.0, 500.0, 900.0, 600.0).clamp_to(640, 480);
        assert!(r.is_degenerate());
        assert_eq!(r.area(), 0.0);
    }

    #[test]
    fn inverted_rect_is_degenerate() {
        assert!(PixelRect::new(100.0, 100.0, 50.0, 200.0).is_degenerate());
        assert!(PixelRect::new(50.0, 200.0, 100.0, 100.0).is_degenerate());
        // Zero-width counts as degenerate too (x1 >= x2)
        assert!(PixelRect::new(50.0, 0.0, 50.0, 100.0).is_degenerate());
    }
}
