//! # Mugsmith Core
//!
//! Editing logic for the mug designer: the element model, pointer-driven
//! move/resize, text editing, greedy text wrapping and the order wizard.
//! Nothing in this crate rasterizes or performs I/O.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   Editor                    │
//! ├─────────────────────────────────────────────┤
//! │  Interaction     │  Text Editing            │
//! │  - Move/resize   │  - Edit buffer           │
//! │  - Clamping      │  - Debounced commit      │
//! │  - Frame coalesc │  - Double activation     │
//! ├─────────────────────────────────────────────┤
//! │  Scene           │  Layout                  │
//! │  - Elements      │  - Greedy wrap           │
//! │  - Z-order       │  - Alignment             │
//! │  - Resources     │  - Letterbox transform   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Data flows one way: the interaction layer mutates the [`Scene`], and the
//! renderer reads it when exporting.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod color;
pub mod config;
pub mod crop;
pub mod editor;
pub mod element;
pub mod error;
pub mod event;
pub mod frame;
pub mod geometry;
pub mod interaction;
pub mod layout;
pub mod resource;
pub mod scene;
pub mod text_edit;
pub mod upload;
pub mod viewport;
pub mod wizard;
pub mod wrap;

pub use color::Rgba;
pub use config::{EditorConfig, DEFAULT_MAX_UPLOAD_BYTES};
pub use crop::{CropConfig, CropRect, PixelCrop};
pub use editor::Editor;
pub use element::{
    Element, ElementId, ElementKind, FontFamily, FontSpec, FontStyle, FontWeight, GenericFamily,
    TextAlign, TextStyle, MIN_ELEMENT_SIZE,
};
pub use error::{CanvasError, CanvasResult};
pub use event::{EditKey, KeyModifiers};
pub use frame::{FrameScheduler, FrameToken};
pub use geometry::{Point, Rect, Size};
pub use interaction::{
    Cursor, Gesture, HostEffects, InteractionController, ResizeHandle, VisualFeedback,
};
pub use layout::{layout_text, LaidOutLine, TextBoxMetrics};
pub use resource::{ImageHandle, ResourceId, ResourceTracker};
pub use scene::Scene;
pub use text_edit::{EditAction, TextEditSession};
pub use upload::UploadPolicy;
pub use viewport::ExportTransform;
pub use wizard::{ContactDetails, Wizard, WizardData, WizardStep};
pub use wrap::{wrap_text, TextMeasure};

/// Mugsmith core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
