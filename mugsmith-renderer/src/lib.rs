//! # Mugsmith Renderer
//!
//! Offscreen compositing and export for editor scenes.
//!
//! ## Export Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                SceneExporter                │
//! ├──────────────┬──────────────┬───────────────┤
//! │ Decode       │ Compose      │ Encode        │
//! │ (fan-out,    │ (tiny-skia,  │ (PNG, JPEG,   │
//! │  join all)   │  letterbox)  │  WebP)        │
//! └──────────────┴──────────────┴───────────────┘
//! ```
//!
//! Text is measured and drawn with the same [`FontBook`], so the lines the
//! editor wraps are the lines that land in the export.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod compose;
pub mod crop;
pub mod decode;
pub mod error;
pub mod export;
pub mod fonts;
pub mod texture;

pub use compose::Compositor;
pub use crop::{crop_texture, crop_to_texture};
pub use decode::{decode_scene_images, DecodedImages};
pub use error::{RenderError, RenderResult};
pub use export::{
    encode, export_file_name, magic_image_file_name, ExportArtifact, ExportConfig, ExportFormat,
    ExportResolution, SceneExporter,
};
pub use fonts::FontBook;
pub use texture::{
    data_uri_bytes, decode_data_uri, decode_image, decode_image_with_hint, ImageFormat, TextureData,
};

/// Mugsmith renderer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
