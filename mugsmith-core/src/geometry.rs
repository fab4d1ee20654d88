//! Points, sizes and rectangles in logical canvas space.

use serde::{Deserialize, Serialize};

/// A point in logical canvas pixels, top-left origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    #[must_use]
    pub fn delta_from(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    /// Component-wise sum.
    #[must_use]
    pub fn offset_by(self, delta: Self) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y)
    }
}

/// A width/height pair in logical canvas pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Size {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from a position and size.
    #[must_use]
    pub const fn from_parts(position: Point, size: Size) -> Self {
        Self::new(position.x, position.y, size.width, size.height)
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Check whether a point lies inside (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }
}

/// Clamp `value` into `[lo, hi]`.
///
/// Unlike [`f32::clamp`] this never panics: when `hi < lo` the lower bound wins.
#[must_use]
pub fn clamp_range(value: f32, lo: f32, hi: f32) -> f32 {
    value.min(hi).max(lo)
}

/// Clamp a rectangle so it lies within `[0, bounds.width] x [0, bounds.height]`.
///
/// Size is floored at `min_size` (or the bounds, whichever is smaller) and
/// capped at the bounds; position is then clamped so the far edges fit.
#[must_use]
pub fn clamp_rect(rect: Rect, bounds: Size, min_size: f32) -> Rect {
    let width = clamp_range(rect.width, min_size.min(bounds.width), bounds.width);
    let height = clamp_range(rect.height, min_size.min(bounds.height), bounds.height);
    let x = clamp_range(rect.x, 0.0, bounds.width - width);
    let y = clamp_range(rect.y, 0.0, bounds.height - height);
    Rect::new(x, y, width, height)
}
