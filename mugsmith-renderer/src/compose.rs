//! Offscreen compositor.
//!
//! Paints a scene onto a raster surface at an arbitrary output resolution:
//! background first, then every element in ascending z-order under a uniform
//! letterbox transform from canvas space to output space.

use ab_glyph::{point, Font, FontArc, GlyphId, ScaleFont};
use mugsmith_core::{
    layout_text, Element, ElementKind, ExportTransform, Point, Rgba, Scene, Size,
    TextBoxMetrics, TextStyle,
};
use tiny_skia::{
    Color, FilterQuality, Mask, Paint, Pixmap, PixmapPaint, Rect as SkiaRect, Transform,
};

use crate::decode::DecodedImages;
use crate::error::{RenderError, RenderResult};
use crate::fonts::{em_scale, FontBook};

/// Rasterizes scenes.
#[derive(Debug)]
pub struct Compositor<'a> {
    fonts: &'a FontBook,
    metrics: TextBoxMetrics,
}

impl<'a> Compositor<'a> {
    /// Compositor drawing text with `fonts`.
    #[must_use]
    pub fn new(fonts: &'a FontBook) -> Self {
        Self {
            fonts,
            metrics: TextBoxMetrics::default(),
        }
    }

    /// Override text box padding and line height.
    #[must_use]
    pub fn with_metrics(mut self, metrics: TextBoxMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Paint `scene` at `width` x `height` using already decoded `images`.
    ///
    /// Image elements whose bitmap is missing are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Surface`] if the surface cannot be allocated, or
    /// [`RenderError::Canvas`] if the background color is invalid.
    #[allow(clippy::cast_precision_loss)]
    pub fn render(
        &self,
        scene: &Scene,
        images: &DecodedImages,
        width: u32,
        height: u32,
    ) -> RenderResult<Pixmap> {
        let mut surface = Pixmap::new(width, height).ok_or_else(|| {
            RenderError::Surface(format!("cannot allocate {width}x{height} surface"))
        })?;
        surface.fill(to_color(scene.background_rgba()?));

        let fit = ExportTransform::fit(scene.size(), Size::new(width as f32, height as f32));
        let base = Transform::from_translate(fit.offset_x, fit.offset_y)
            .pre_scale(fit.scale, fit.scale);

        for element in scene.paint_order() {
            match &element.kind {
                ElementKind::Image { .. } => match images.get(element.id) {
                    Some(bitmap) => draw_image(&mut surface, element, bitmap, base),
                    None => tracing::debug!(id = %element.id, "no bitmap, image skipped"),
                },
                ElementKind::Text { content, style } => {
                    self.draw_text(&mut surface, element, content, style, &fit);
                }
            }
        }

        Ok(surface)
    }

    #[allow(clippy::cast_precision_loss)]
    fn draw_text(
        &self,
        surface: &mut Pixmap,
        element: &Element,
        content: &str,
        style: &TextStyle,
        fit: &ExportTransform,
    ) {
        let request = style.font_spec();
        let Some(font) = self.fonts.font_for(&request) else {
            tracing::warn!(
                id = %element.id,
                family = request.family.name(),
                "no font face, text skipped"
            );
            return;
        };
        let color = match style.rgba() {
            Ok(color) => color,
            Err(e) => {
                tracing::warn!(id = %element.id, error = %e, "bad text color, text skipped");
                return;
            }
        };
        let Some(mut mask) = Mask::new(surface.width(), surface.height()) else {
            return;
        };

        let ascent = self.fonts.ascent(&request);
        let lines = layout_text(content, style, element.rect(), self.metrics, self.fonts);
        for line in &lines {
            if line.text.is_empty() {
                continue;
            }
            let origin = fit.map_point(Point::new(line.x, line.y + ascent));
            rasterize_line(&mut mask, font, request.size_px * fit.scale, origin, &line.text);
        }

        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        paint.anti_alias = false;
        let (width, height) = (surface.width() as f32, surface.height() as f32);
        if let Some(full) = SkiaRect::from_xywh(0.0, 0.0, width, height) {
            surface.fill_rect(full, &paint, Transform::identity(), Some(&mask));
        }
    }
}

fn to_color(color: Rgba) -> Color {
    Color::from_rgba8(color.r, color.g, color.b, color.a)
}

/// Stretch `bitmap` into the element rectangle.
#[allow(clippy::cast_precision_loss)]
fn draw_image(surface: &mut Pixmap, element: &Element, bitmap: &Pixmap, base: Transform) {
    let rect = element.rect();
    let transform = base
        .pre_translate(rect.x, rect.y)
        .pre_scale(
            rect.width / bitmap.width() as f32,
            rect.height / bitmap.height() as f32,
        );
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    surface.draw_pixmap(0, 0, bitmap.as_ref(), &paint, transform, None);
}

/// Accumulate glyph coverage for one line with its baseline at `origin`
/// (output pixels).
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]
fn rasterize_line(
    mask: &mut Mask,
    font: &FontArc,
    size_px: f32,
    origin: Point,
    text: &str,
) {
    let scale = em_scale(font, size_px);
    let scaled = font.as_scaled(scale);
    let (width, height) = (mask.width() as i32, mask.height() as i32);
    let stride = mask.width() as usize;
    let data = mask.data_mut();

    let mut pen_x = origin.x;
    let mut previous: Option<GlyphId> = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            pen_x += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, point(pen_x, origin.y));
        pen_x += scaled.h_advance(id);
        previous = Some(id);

        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        let (left, top) = (bounds.min.x as i32, bounds.min.y as i32);
        outlined.draw(|gx, gy, coverage| {
            let x = left + gx as i32;
            let y = top + gy as i32;
            if x < 0 || y < 0 || x >= width || y >= height {
                return;
            }
            let index = y as usize * stride + x as usize;
            let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
            data[index] = data[index].max(value);
        });
    }
}
