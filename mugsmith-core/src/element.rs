//! Placed elements - the building blocks of an editing canvas.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::color::Rgba;
use crate::error::CanvasResult;
use crate::geometry::{Point, Rect, Size};
use crate::resource::ImageHandle;

/// Smallest width or height an element may be resized to.
pub const MIN_ELEMENT_SIZE: f32 = 50.0;

/// Unique identifier for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Font families offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    /// Arial.
    #[default]
    Arial,
    /// Helvetica.
    Helvetica,
    /// Times New Roman.
    TimesNewRoman,
    /// Georgia.
    Georgia,
    /// Verdana.
    Verdana,
    /// Courier New.
    CourierNew,
    /// Comic Sans MS.
    ComicSansMs,
    /// Impact.
    Impact,
}

/// Generic family used when a named family is not installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericFamily {
    /// Sans-serif.
    SansSerif,
    /// Serif.
    Serif,
    /// Monospace.
    Monospace,
    /// Cursive.
    Cursive,
}

impl FontFamily {
    /// Every allowed family.
    pub const ALL: [Self; 8] = [
        Self::Arial,
        Self::Helvetica,
        Self::TimesNewRoman,
        Self::Georgia,
        Self::Verdana,
        Self::CourierNew,
        Self::ComicSansMs,
        Self::Impact,
    ];

    /// Family name as installed on the system.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Arial => "Arial",
            Self::Helvetica => "Helvetica",
            Self::TimesNewRoman => "Times New Roman",
            Self::Georgia => "Georgia",
            Self::Verdana => "Verdana",
            Self::CourierNew => "Courier New",
            Self::ComicSansMs => "Comic Sans MS",
            Self::Impact => "Impact",
        }
    }

    /// Look up a family by its display name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|family| family.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Generic fallback for this family.
    #[must_use]
    pub fn generic(self) -> GenericFamily {
        match self {
            Self::Arial | Self::Helvetica | Self::Verdana | Self::Impact => {
                GenericFamily::SansSerif
            }
            Self::TimesNewRoman | Self::Georgia => GenericFamily::Serif,
            Self::CourierNew => GenericFamily::Monospace,
            Self::ComicSansMs => GenericFamily::Cursive,
        }
    }
}

/// Font weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    /// Regular weight.
    #[default]
    Normal,
    /// Bold weight.
    Bold,
}

/// Font slant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    /// Upright.
    #[default]
    Normal,
    /// Italic.
    Italic,
}

/// Horizontal alignment of wrapped lines inside a text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

/// Everything needed to measure a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    /// Family.
    pub family: FontFamily,
    /// Em size in logical pixels.
    pub size_px: f32,
    /// Weight.
    pub weight: FontWeight,
    /// Slant.
    pub style: FontStyle,
}

/// Style attributes of a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font family from the allowlist.
    pub font_family: FontFamily,
    /// Font size in logical pixels.
    pub font_size_px: f32,
    /// Fill color as hex.
    pub color: String,
    /// Weight.
    pub weight: FontWeight,
    /// Slant.
    pub italic: FontStyle,
    /// Line alignment.
    pub align: TextAlign,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: FontFamily::Arial,
            font_size_px: 24.0,
            color: "#000000".to_string(),
            weight: FontWeight::Normal,
            italic: FontStyle::Normal,
            align: TextAlign::Left,
        }
    }
}

impl TextStyle {
    /// Font used to measure and draw this style.
    #[must_use]
    pub fn font_spec(&self) -> FontSpec {
        FontSpec {
            family: self.font_family,
            size_px: self.font_size_px,
            weight: self.weight,
            style: self.italic,
        }
    }

    /// Parsed fill color.
    ///
    /// # Errors
    ///
    /// Returns an error if `color` is not a valid hex color.
    pub fn rgba(&self) -> CanvasResult<Rgba> {
        Rgba::from_hex(&self.color)
    }
}

/// The content of a placed element.
#[derive(Debug, Clone)]
pub enum ElementKind {
    /// A placed photo.
    Image {
        /// Owned reference to the loaded source bytes.
        source: ImageHandle,
    },

    /// A text block.
    Text {
        /// Text content, may contain explicit line breaks.
        content: String,
        /// Style attributes.
        style: TextStyle,
    },
}

/// A placed element with content, geometry and paint order.
#[derive(Debug, Clone)]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// Element content.
    pub kind: ElementKind,
    /// Top-left corner in canvas space.
    pub position: Point,
    /// Size in canvas space.
    pub size: Size,
    /// Paint order; ties broken by insertion order.
    pub z_index: i32,
}

impl Element {
    /// Create an image element.
    #[must_use]
    pub fn image(source: ImageHandle, position: Point, size: Size) -> Self {
        Self {
            id: ElementId::new(),
            kind: ElementKind::Image { source },
            position,
            size,
            z_index: 0,
        }
    }

    /// Create a text element.
    #[must_use]
    pub fn text(content: impl Into<String>, style: TextStyle, position: Point, size: Size) -> Self {
        Self {
            id: ElementId::new(),
            kind: ElementKind::Text {
                content: content.into(),
                style,
            },
            position,
            size,
            z_index: 0,
        }
    }

    /// Set the z-index.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Bounding rectangle in canvas space.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::from_parts(self.position, self.size)
    }

    /// Whether this is an image element.
    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self.kind, ElementKind::Image { .. })
    }

    /// Whether this is a text element.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self.kind, ElementKind::Text { .. })
    }

    /// Text content, if this is a text element.
    #[must_use]
    pub fn text_content(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Text { content, .. } => Some(content),
            ElementKind::Image { .. } => None,
        }
    }

    /// Check if a point (in canvas coordinates) is within this element.
    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        self.rect().contains(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_lookup() {
        assert_eq!(FontFamily::from_name("times new roman"), Some(FontFamily::TimesNewRoman));
        assert_eq!(FontFamily::from_name("Wingdings"), None);
        assert_eq!(FontFamily::CourierNew.generic(), GenericFamily::Monospace);
    }

    #[test]
    fn test_style_serde_names() {
        let style = TextStyle {
            font_family: FontFamily::ComicSansMs,
            weight: FontWeight::Bold,
            italic: FontStyle::Italic,
            align: TextAlign::Center,
            ..TextStyle::default()
        };
        let json = serde_json::to_value(&style).expect("serialize");
        assert_eq!(json["font_family"], "comic-sans-ms");
        assert_eq!(json["weight"], "bold");
        assert_eq!(json["italic"], "italic");
        assert_eq!(json["align"], "center");
    }

    #[test]
    fn test_text_element_accessors() {
        let element = Element::text(
            "Hello",
            TextStyle::default(),
            Point::new(10.0, 10.0),
            Size::new(100.0, 50.0),
        );
        assert!(element.is_text());
        assert_eq!(element.text_content(), Some("Hello"));
        assert!(element.contains_point(Point::new(60.0, 40.0)));
        assert!(!element.contains_point(Point::new(5.0, 40.0)));
    }
}
