//! Editor session configuration.

use serde::{Deserialize, Serialize};

use crate::element::MIN_ELEMENT_SIZE;
use crate::geometry::Size;

/// Default ceiling for a client-side upload (2 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

/// Tunables for one editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Logical canvas width.
    pub canvas_width: f32,
    /// Logical canvas height.
    pub canvas_height: f32,
    /// Background color painted before any element.
    pub background_color: String,
    /// Maximum number of concurrently placed images.
    pub max_images: usize,
    /// Minimum element width/height.
    pub min_element_size: f32,
    /// Inner padding of text boxes.
    pub text_padding: f32,
    /// Line height as a multiple of font size.
    pub line_height_factor: f32,
    /// Inactivity before buffered text edits are committed.
    pub edit_debounce_ms: u64,
    /// Two activations closer than this enter text editing.
    pub double_activation_ms: u64,
    /// Upload size ceiling.
    pub max_upload_bytes: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 600.0,
            background_color: "#ffffff".to_string(),
            max_images: 3,
            min_element_size: MIN_ELEMENT_SIZE,
            text_padding: 4.0,
            line_height_factor: 1.2,
            edit_debounce_ms: 300,
            double_activation_ms: 400,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl EditorConfig {
    /// Logical canvas size.
    #[must_use]
    pub fn canvas_size(&self) -> Size {
        Size::new(self.canvas_width, self.canvas_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r##"{"canvas_width": 1000, "background_color": "#000"}"##)
                .expect("config");
        assert!((config.canvas_width - 1000.0).abs() < f32::EPSILON);
        assert!((config.canvas_height - 600.0).abs() < f32::EPSILON);
        assert_eq!(config.background_color, "#000");
        assert_eq!(config.max_images, 3);
        assert_eq!(config.edit_debounce_ms, 300);
    }
}
