//! Letterboxed mapping from logical canvas space to an output resolution.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect, Size};

/// Uniform scale plus centering offsets that fit the canvas into a target frame.
///
/// The same factor is applied on both axes, so nothing drawn through this
/// transform is ever distorted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportTransform {
    /// Uniform scale factor.
    pub scale: f32,
    /// Horizontal letterbox offset in target pixels.
    pub offset_x: f32,
    /// Vertical letterbox offset in target pixels.
    pub offset_y: f32,
}

impl ExportTransform {
    /// Identity mapping.
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    /// Fit `canvas` into `target`, preserving aspect ratio and centering.
    ///
    /// Degenerate canvases map with the identity.
    #[must_use]
    pub fn fit(canvas: Size, target: Size) -> Self {
        if canvas.width <= 0.0 || canvas.height <= 0.0 {
            return Self::IDENTITY;
        }
        let scale = (target.width / canvas.width).min(target.height / canvas.height);
        Self {
            scale,
            offset_x: (target.width - canvas.width * scale) / 2.0,
            offset_y: (target.height - canvas.height * scale) / 2.0,
        }
    }

    /// Horizontal and vertical scale factors. Always equal.
    #[must_use]
    pub fn scale_xy(&self) -> (f32, f32) {
        (self.scale, self.scale)
    }

    /// Map a canvas point into target space.
    #[must_use]
    pub fn map_point(&self, point: Point) -> Point {
        Point::new(
            self.offset_x + point.x * self.scale,
            self.offset_y + point.y * self.scale,
        )
    }

    /// Map a canvas rectangle into target space.
    #[must_use]
    pub fn map_rect(&self, rect: Rect) -> Rect {
        let origin = self.map_point(Point::new(rect.x, rect.y));
        Rect::new(
            origin.x,
            origin.y,
            rect.width * self.scale,
            rect.height * self.scale,
        )
    }
}
