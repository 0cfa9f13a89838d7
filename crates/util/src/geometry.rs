//! Checkpoint-overlay geometry.
//!
//! A tour highlight covers one or more already-measured screen rectangles;
//! the overlay draws the bounding-box union of them. Measurement (querying
//! live elements) happens in the render layer; this module only does the
//! arithmetic, so it stays pure and testable.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and extents.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    fn right(&self) -> f64 {
        self.x + self.width
    }

    fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Bounding-box union of the given rectangles.
///
/// Returns `None` for an empty slice. A checkpoint with no measured
/// targets has no highlight, which the caller renders as "no overlay"
/// rather than a degenerate rectangle at the origin.
pub fn union_rect(rects: &[Rect]) -> Option<Rect> {
    let (first, rest) = rects.split_first()?;
    let mut left = first.x;
    let mut top = first.y;
    let mut right = first.right();
    let mut bottom = first.bottom();

    for rect in rest {
        left = left.min(rect.x);
        top = top.min(rect.y);
        right = right.max(rect.right());
        bottom = bottom.max(rect.bottom());
    }

    Some(Rect::new(left, top, right - left, bottom - top))
}
