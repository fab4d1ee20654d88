//! Line placement inside a text box.

use crate::element::{TextAlign, TextStyle};
use crate::geometry::Rect;
use crate::wrap::{wrap_text, TextMeasure};

/// A wrapped line positioned in canvas space.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutLine {
    /// Line text.
    pub text: String,
    /// Left edge of the line.
    pub x: f32,
    /// Top of the line box (text is top-anchored).
    pub y: f32,
    /// Measured width.
    pub width: f32,
}

/// Box metrics shared by the editor and the compositor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBoxMetrics {
    /// Inner padding on every side.
    pub padding: f32,
    /// Line height as a multiple of font size.
    pub line_height_factor: f32,
}

impl Default for TextBoxMetrics {
    fn default() -> Self {
        Self {
            padding: 4.0,
            line_height_factor: 1.2,
        }
    }
}

/// Wrap `content` to the inner width of `rect` and position each line
/// according to the style's alignment.
#[must_use]
pub fn layout_text<M: TextMeasure + ?Sized>(
    content: &str,
    style: &TextStyle,
    rect: Rect,
    metrics: TextBoxMetrics,
    measurer: &M,
) -> Vec<LaidOutLine> {
    let font = style.font_spec();
    let max_width = rect.width - 2.0 * metrics.padding;
    let line_height = style.font_size_px * metrics.line_height_factor;

    wrap_text(content, max_width, &font, measurer)
        .into_iter()
        .enumerate()
        .map(|(index, text)| {
            let width = measurer.measure(&text, &font);
            let x = match style.align {
                TextAlign::Left => rect.x + metrics.padding,
                TextAlign::Center => rect.x + rect.width / 2.0 - width / 2.0,
                TextAlign::Right => rect.right() - metrics.padding - width,
            };
            #[allow(clippy::cast_precision_loss)]
            let y = rect.y + metrics.padding + index as f32 * line_height;
            LaidOutLine { text, x, y, width }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::FontSpec;

    struct HalfEm;

    impl TextMeasure for HalfEm {
        #[allow(clippy::cast_precision_loss)]
        fn measure(&self, text: &str, font: &FontSpec) -> f32 {
            text.chars().count() as f32 * font.size_px * 0.5
        }
    }

    #[test]
    fn test_layout_alignment_and_baselines() {
        let style = TextStyle {
            font_size_px: 10.0,
            align: TextAlign::Center,
            ..TextStyle::default()
        };
        let rect = Rect::new(100.0, 50.0, 40.0, 100.0);
        let lines = layout_text("aaaa bb", &style, rect, TextBoxMetrics::default(), &HalfEm);
        assert_eq!(lines.len(), 2);
        assert!((lines[0].x - 110.0).abs() < 1e-4);
        assert!((lines[0].y - 54.0).abs() < 1e-4);
        assert!((lines[1].x - 115.0).abs() < 1e-4);
        assert!((lines[1].y - 66.0).abs() < 1e-4);

        let right = TextStyle {
            align: TextAlign::Right,
            ..style.clone()
        };
        let lines = layout_text("bb", &right, rect, TextBoxMetrics::default(), &HalfEm);
        assert!((lines[0].x - 126.0).abs() < 1e-4);

        let left = TextStyle {
            align: TextAlign::Left,
            ..style
        };
        let lines = layout_text("bb", &left, rect, TextBoxMetrics::default(), &HalfEm);
        assert!((lines[0].x - 104.0).abs() < 1e-4);
    }

    #[test]
    fn test_empty_content_yields_one_empty_line() {
        let rect = Rect::new(0.0, 0.0, 100.0, 40.0);
        let lines = layout_text("", &TextStyle::default(), rect, TextBoxMetrics::default(), &HalfEm);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].text.is_empty());
        assert!((lines[0].x - 4.0).abs() < 1e-4);
    }
}
