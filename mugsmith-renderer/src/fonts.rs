//! Font book: resolves the editor's font allowlist to loaded faces and
//! measures text with them.
//!
//! Sizes follow CSS semantics: `font_size_px` is the em size, so glyphs are
//! scaled by `units_per_em` rather than by the face's line height.

use std::collections::HashMap;
use std::path::Path;

use ab_glyph::{Font, FontArc, FontVec, GlyphId, PxScale, ScaleFont};
use fontdb::{Database, Family, Query, Stretch, Style, Weight, ID};
use mugsmith_core::{FontFamily, FontSpec, FontStyle, FontWeight, GenericFamily, TextMeasure};

use crate::error::{RenderError, RenderResult};

/// Key of one resolved face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FaceKey {
    family: FontFamily,
    bold: bool,
    italic: bool,
}

impl FaceKey {
    fn of(request: &FontSpec) -> Self {
        Self {
            family: request.family,
            bold: request.weight == FontWeight::Bold,
            italic: request.style == FontStyle::Italic,
        }
    }

    fn all() -> impl Iterator<Item = Self> {
        FontFamily::ALL.into_iter().flat_map(|family| {
            [(false, false), (true, false), (false, true), (true, true)]
                .into_iter()
                .map(move |(bold, italic)| Self {
                    family,
                    bold,
                    italic,
                })
        })
    }
}

/// Loaded faces for every allowlisted family, weight and slant.
pub struct FontBook {
    faces: HashMap<FaceKey, FontArc>,
    face_count: usize,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("resolved", &self.faces.len())
            .field("face_count", &self.face_count)
            .finish()
    }
}

impl FontBook {
    /// Resolve against the fonts installed on this system.
    #[must_use]
    pub fn system() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        Self::from_database(&db)
    }

    /// Resolve against font files in `dir` (recursively).
    #[must_use]
    pub fn from_dir(dir: &Path) -> Self {
        let mut db = Database::new();
        db.load_fonts_dir(dir);
        Self::from_database(&db)
    }

    /// Resolve against raw font files.
    #[must_use]
    pub fn from_font_data(fonts: impl IntoIterator<Item = Vec<u8>>) -> Self {
        let mut db = Database::new();
        for data in fonts {
            db.load_font_data(data);
        }
        Self::from_database(&db)
    }

    /// Resolve every allowlisted face against `db`.
    ///
    /// Each request tries the named family, then its generic family, then any
    /// face at all. Faces shared by several requests are loaded once.
    #[must_use]
    pub fn from_database(db: &Database) -> Self {
        let mut loaded: HashMap<ID, Option<FontArc>> = HashMap::new();
        let mut faces = HashMap::new();

        for key in FaceKey::all() {
            let Some(id) = resolve(db, key) else {
                continue;
            };
            let font = loaded
                .entry(id)
                .or_insert_with(|| load_face(db, id))
                .clone();
            if let Some(font) = font {
                faces.insert(key, font);
            }
        }

        let face_count = loaded.values().filter(|f| f.is_some()).count();
        if faces.is_empty() {
            tracing::warn!("no usable font faces found, text will not be drawn");
        } else {
            tracing::info!(faces = face_count, "font book ready");
        }
        Self { faces, face_count }
    }

    /// True when no face could be loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Face used for `request`.
    #[must_use]
    pub fn font_for(&self, request: &FontSpec) -> Option<&FontArc> {
        self.faces.get(&FaceKey::of(request))
    }

    /// Face used for `request`, as an error when none is available.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Font`] when the book is empty.
    pub fn require(&self, request: &FontSpec) -> RenderResult<&FontArc> {
        self.font_for(request).ok_or_else(|| {
            RenderError::Font(format!("no face for {}", request.family.name()))
        })
    }

    /// Distance from the top of a line box to its baseline.
    #[must_use]
    pub fn ascent(&self, request: &FontSpec) -> f32 {
        self.font_for(request)
            .map_or(request.size_px * 0.8, |font| {
                font.as_scaled(em_scale(font, request.size_px)).ascent()
            })
    }
}

impl TextMeasure for FontBook {
    fn measure(&self, text: &str, font: &FontSpec) -> f32 {
        match self.font_for(font) {
            Some(face) => advance_width(face, em_scale(face, font.size_px), text),
            // Without a face the text is never drawn; keep wrapping stable.
            #[allow(clippy::cast_precision_loss)]
            None => text.chars().count() as f32 * font.size_px * 0.5,
        }
    }
}

/// Pixel scale that makes one em equal `size_px`.
#[must_use]
pub fn em_scale(font: &FontArc, size_px: f32) -> PxScale {
    let height = font.height_unscaled();
    let units_per_em = font.units_per_em().unwrap_or(height);
    if units_per_em <= 0.0 {
        return PxScale::from(size_px);
    }
    PxScale::from(size_px * height / units_per_em)
}

/// Total advance of `text` including kerning.
#[must_use]
pub fn advance_width(font: &FontArc, scale: PxScale, text: &str) -> f32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0;
    let mut previous: Option<GlyphId> = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        previous = Some(id);
    }
    width
}

fn generic_family(generic: GenericFamily) -> Family<'static> {
    match generic {
        GenericFamily::SansSerif => Family::SansSerif,
        GenericFamily::Serif => Family::Serif,
        GenericFamily::Monospace => Family::Monospace,
        GenericFamily::Cursive => Family::Cursive,
    }
}

fn query_face(db: &Database, families: &[Family<'_>], key: FaceKey) -> Option<ID> {
    db.query(&Query {
        families,
        weight: if key.bold { Weight::BOLD } else { Weight::NORMAL },
        stretch: Stretch::Normal,
        style: if key.italic { Style::Italic } else { Style::Normal },
    })
}

fn resolve(db: &Database, key: FaceKey) -> Option<ID> {
    query_face(db, &[Family::Name(key.family.name())], key)
        .or_else(|| query_face(db, &[generic_family(key.family.generic())], key))
        .or_else(|| {
            let fallback = db.faces().next().map(|face| face.id);
            if fallback.is_some() {
                tracing::debug!(family = key.family.name(), "falling back to first available face");
            }
            fallback
        })
}

fn load_face(db: &Database, id: ID) -> Option<FontArc> {
    let parsed = db.with_face_data(id, |data, index| {
        FontVec::try_from_vec_and_index(data.to_vec(), index)
    })?;
    match parsed {
        Ok(font) => Some(FontArc::new(font)),
        Err(e) => {
            tracing::warn!(error = %e, "unusable font face");
            None
        }
    }
}
