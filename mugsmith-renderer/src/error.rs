//! Renderer error types.

use mugsmith_core::CanvasError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while compositing or exporting.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Resource loading or decoding failed.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// Offscreen surface could not be allocated.
    #[error("Surface error: {0}")]
    Surface(String),

    /// No usable font face.
    #[error("Font error: {0}")]
    Font(String),

    /// Encoding the raster failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// Scene data was unusable (e.g. an invalid background color).
    #[error("Scene error: {0}")]
    Canvas(#[from] CanvasError),

    /// Writing an artifact failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
