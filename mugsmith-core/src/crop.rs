//! Crop selection for the mug print texture.
//!
//! The aspect ratio is a parameter of the cropper: the mug editor uses a
//! square crop, the prompt editor a 16:9 one, and generated images take
//! theirs from the mug's print template.

use serde::{Deserialize, Serialize};

use crate::error::{CanvasError, CanvasResult};
use crate::geometry::clamp_range;

/// Smallest crop side, in percent of the source.
const MIN_CROP_PERCENT: f32 = 1.0;

/// Cropper configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CropConfig {
    /// Width / height of the crop in source pixels; `None` for free-form.
    pub aspect_ratio: Option<f32>,
}

impl CropConfig {
    /// 1:1 crop.
    #[must_use]
    pub const fn square() -> Self {
        Self {
            aspect_ratio: Some(1.0),
        }
    }

    /// 16:9 crop.
    #[must_use]
    pub fn widescreen() -> Self {
        Self {
            aspect_ratio: Some(16.0 / 9.0),
        }
    }

    /// Unconstrained crop.
    #[must_use]
    pub const fn free() -> Self {
        Self { aspect_ratio: None }
    }

    /// Aspect derived from a print template's printable area.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidCrop`] for non-positive dimensions.
    pub fn from_print_template(width: f32, height: f32) -> CanvasResult<Self> {
        if width <= 0.0 || height <= 0.0 || !width.is_finite() || !height.is_finite() {
            return Err(CanvasError::InvalidCrop(format!(
                "print template {width}x{height} has no area"
            )));
        }
        Ok(Self {
            aspect_ratio: Some(width / height),
        })
    }

    /// Largest crop with the configured aspect, centered in the source.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn centered(&self, image_width: u32, image_height: u32) -> CropRect {
        let Some(aspect) = self.aspect_ratio else {
            return CropRect::FULL;
        };
        if image_width == 0 || image_height == 0 {
            return CropRect::FULL;
        }
        let (iw, ih) = (image_width as f32, image_height as f32);

        if iw / ih > aspect {
            let width = ih * aspect / iw * 100.0;
            CropRect::new((100.0 - width) / 2.0, 0.0, width, 100.0)
        } else {
            let height = iw / aspect / ih * 100.0;
            CropRect::new(0.0, (100.0 - height) / 2.0, 100.0, height)
        }
    }

    /// Pull a user-adjusted crop back inside the source and onto the aspect.
    ///
    /// Width drives height when an aspect is set; if the derived height does
    /// not fit, the crop shrinks until it does.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn constrain(&self, rect: CropRect, image_width: u32, image_height: u32) -> CropRect {
        let mut width = clamp_range(rect.width, MIN_CROP_PERCENT, 100.0);
        let mut height = clamp_range(rect.height, MIN_CROP_PERCENT, 100.0);

        if let (Some(aspect), true) = (self.aspect_ratio, image_width > 0 && image_height > 0) {
            let ratio = image_width as f32 / (aspect * image_height as f32);
            height = width * ratio;
            if height > 100.0 {
                height = 100.0;
                width = height / ratio;
            }
        }

        let x = clamp_range(rect.x, 0.0, 100.0 - width);
        let y = clamp_range(rect.y, 0.0, 100.0 - height);
        CropRect::new(x, y, width, height)
    }
}

/// A crop rectangle in percent of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    /// Left edge, percent.
    pub x: f32,
    /// Top edge, percent.
    pub y: f32,
    /// Width, percent.
    pub width: f32,
    /// Height, percent.
    pub height: f32,
}

/// A crop rectangle in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelCrop {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl CropRect {
    /// The whole source.
    pub const FULL: Self = Self::new(0.0, 0.0, 100.0, 100.0);

    /// Create a crop rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Convert to source pixels.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidCrop`] when the source is empty, the
    /// rectangle has no area, or it lies outside the source.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn to_pixels(&self, image_width: u32, image_height: u32) -> CanvasResult<PixelCrop> {
        if image_width == 0 || image_height == 0 {
            return Err(CanvasError::InvalidCrop("source image is empty".into()));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(CanvasError::InvalidCrop(format!(
                "crop {}x{} has no area",
                self.width, self.height
            )));
        }
        if self.x < 0.0 || self.y < 0.0 || self.x >= 100.0 || self.y >= 100.0 {
            return Err(CanvasError::InvalidCrop(format!(
                "crop origin ({}, {}) outside source",
                self.x, self.y
            )));
        }

        let (iw, ih) = (image_width as f32, image_height as f32);
        let x = ((self.x / 100.0 * iw).round() as u32).min(image_width - 1);
        let y = ((self.y / 100.0 * ih).round() as u32).min(image_height - 1);
        let width = ((self.width / 100.0 * iw).round() as u32).clamp(1, image_width - x);
        let height = ((self.height / 100.0 * ih).round() as u32).clamp(1, image_height - y);
        Ok(PixelCrop {
            x,
            y,
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_centered_on_landscape() {
        let crop = CropConfig::square().centered(400, 200);
        assert_eq!(crop, CropRect::new(25.0, 0.0, 50.0, 100.0));
        let px = crop.to_pixels(400, 200).expect("pixels");
        assert_eq!(px, PixelCrop { x: 100, y: 0, width: 200, height: 200 });
    }

    #[test]
    fn test_widescreen_centered_on_square() {
        let crop = CropConfig::widescreen().centered(1600, 1600);
        let px = crop.to_pixels(1600, 1600).expect("pixels");
        assert_eq!(px.width, 1600);
        assert_eq!(px.height, 900);
        assert_eq!(px.y, 350);
    }

    #[test]
    fn test_print_template_aspect() {
        let config = CropConfig::from_print_template(200.0, 80.0).expect("template");
        assert_eq!(config.aspect_ratio, Some(2.5));
        assert!(CropConfig::from_print_template(0.0, 80.0).is_err());
    }

    #[test]
    fn test_free_crop_is_full_frame() {
        assert_eq!(CropConfig::free().centered(300, 100), CropRect::FULL);
    }

    #[test]
    fn test_constrain_keeps_aspect_and_bounds() {
        let config = CropConfig::square();
        let rect = config.constrain(CropRect::new(80.0, 90.0, 60.0, 10.0), 200, 100);
        // 60% of 200px = 120px wide, needs 120% of 100px height -> shrinks to 100%
        assert!((rect.height - 100.0).abs() < 1e-4);
        assert!((rect.width - 50.0).abs() < 1e-4);
        assert!((rect.x - 50.0).abs() < 1e-4);
        assert!(rect.y.abs() < 1e-4);
    }

    #[test]
    fn test_to_pixels_rejects_degenerate() {
        assert!(CropRect::new(0.0, 0.0, 0.0, 10.0).to_pixels(10, 10).is_err());
        assert!(CropRect::FULL.to_pixels(0, 10).is_err());
        assert!(CropRect::new(100.0, 0.0, 10.0, 10.0).to_pixels(10, 10).is_err());
    }
}
