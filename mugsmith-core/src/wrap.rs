//! Greedy word wrapping against measured glyph widths.
//!
//! Measurement is delegated to a [`TextMeasure`] implementation so the
//! line-break decisions use exactly the metrics the renderer draws with.

use crate::element::FontSpec;

/// Measures the advance width of a run of text.
pub trait TextMeasure {
    /// Rendered width of `text` in logical pixels for `font`.
    fn measure(&self, text: &str, font: &FontSpec) -> f32;
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn measure(&self, text: &str, font: &FontSpec) -> f32 {
        (**self).measure(text, font)
    }
}

/// Break `content` into lines no wider than `max_width`.
///
/// Explicit newlines always break. Within a paragraph, words are added to the
/// current line until the next one would overflow; a word that is wider than
/// `max_width` on its own is split character by character. Empty paragraphs
/// yield empty lines.
#[must_use]
pub fn wrap_text<M: TextMeasure + ?Sized>(
    content: &str,
    max_width: f32,
    font: &FontSpec,
    measurer: &M,
) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in content.split('\n') {
        let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
        let mut current = String::new();
        let mut produced = false;

        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };

            if !current.is_empty() && measurer.measure(&candidate, font) > max_width {
                lines.push(std::mem::take(&mut current));
                produced = true;
                word.clone_into(&mut current);
            } else {
                current = candidate;
            }

            // Only a lone word can overflow here.
            if measurer.measure(&current, font) > max_width {
                let mut fragments = break_word(&current, max_width, font, measurer);
                current = fragments.pop().unwrap_or_default();
                produced |= !fragments.is_empty();
                lines.extend(fragments);
            }
        }

        if !current.is_empty() {
            lines.push(current);
        } else if !produced {
            lines.push(String::new());
        }
    }

    lines
}

/// Split a single word into greedy fragments that each fit `max_width`.
///
/// A character that is wider than `max_width` by itself still forms its own
/// fragment, so the result is never empty for non-empty input.
fn break_word<M: TextMeasure + ?Sized>(
    word: &str,
    max_width: f32,
    font: &FontSpec,
    measurer: &M,
) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut current = String::new();

    for ch in word.chars() {
        let mut candidate = current.clone();
        candidate.push(ch);
        if !current.is_empty() && measurer.measure(&candidate, font) > max_width {
            fragments.push(std::mem::take(&mut current));
            current.push(ch);
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        fragments.push(current);
    }
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{FontFamily, TextStyle};

    /// Every char advances half the font size.
    struct HalfEm;

    impl TextMeasure for HalfEm {
        #[allow(clippy::cast_precision_loss)]
        fn measure(&self, text: &str, font: &FontSpec) -> f32 {
            text.chars().count() as f32 * font.size_px * 0.5
        }
    }

    fn arial(size_px: f32) -> FontSpec {
        TextStyle {
            font_family: FontFamily::Arial,
            font_size_px: size_px,
            ..TextStyle::default()
        }
        .font_spec()
    }

    #[test]
    fn test_quick_brown_fox_wraps_in_order() {
        let font = arial(24.0);
        let lines = wrap_text("The quick brown fox", 80.0, &font, &HalfEm);
        assert_eq!(lines, vec!["The", "quick", "brown", "fox"]);
        for line in &lines {
            assert!(HalfEm.measure(line, &font) <= 80.0);
        }
    }

    #[test]
    fn test_words_share_lines_when_they_fit() {
        let font = arial(10.0);
        let lines = wrap_text("aa bb cc dd", 25.0, &font, &HalfEm);
        assert_eq!(lines, vec!["aa bb", "cc dd"]);
    }

    #[test]
    fn test_long_word_fallback() {
        let font = arial(10.0);
        let lines = wrap_text("abcdefghijkl", 20.0, &font, &HalfEm);
        assert!(lines.len() >= 2);
        assert_eq!(lines.concat(), "abcdefghijkl");
        for line in &lines {
            assert!(HalfEm.measure(line, &font) <= 20.0);
        }
    }

    #[test]
    fn test_long_word_tail_joins_next_word() {
        let font = arial(10.0);
        let lines = wrap_text("abcdefg hi", 20.0, &font, &HalfEm);
        assert_eq!(lines, vec!["abcd", "efg", "hi"]);
        let lines = wrap_text("abcdef g", 20.0, &font, &HalfEm);
        assert_eq!(lines, vec!["abcd", "ef g"]);
    }

    #[test]
    fn test_empty_paragraphs_are_preserved() {
        let font = arial(10.0);
        let lines = wrap_text("one\n\ntwo\n", 100.0, &font, &HalfEm);
        assert_eq!(lines, vec!["one", "", "two", ""]);
    }

    #[test]
    fn test_wrap_is_idempotent() {
        let font = arial(12.0);
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit\n\nsed do eiusmodtemporincididunt ut";
        let first = wrap_text(text, 90.0, &font, &HalfEm);
        let second = wrap_text(&first.join("\n"), 90.0, &font, &HalfEm);
        assert_eq!(first, second);
    }

    #[test]
    fn test_oversized_single_char() {
        let font = arial(100.0);
        let lines = wrap_text("ab", 10.0, &font, &HalfEm);
        assert_eq!(lines, vec!["a", "b"]);
    }
}
