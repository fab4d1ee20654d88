//! Error types for editor operations.

use thiserror::Error;

/// Result type for editor operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in editor operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CanvasError {
    /// Element not found in scene.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// The image cap for a scene has been reached.
    #[error("Image limit reached: at most {0} images may be placed")]
    ImageLimitReached(usize),

    /// Invalid element or gesture operation.
    #[error("Invalid operation on element: {0}")]
    InvalidOperation(String),

    /// A color string could not be parsed.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Upload exceeds the configured size ceiling.
    #[error("Upload too large: {size} bytes exceeds limit of {limit} bytes")]
    UploadTooLarge {
        /// Size of the rejected upload in bytes.
        size: usize,
        /// Configured ceiling in bytes.
        limit: usize,
    },

    /// Upload is not an accepted image type.
    #[error("Unsupported upload type: {0}")]
    UnsupportedUpload(String),

    /// Wizard refused a step transition.
    #[error("Wizard transition refused: {0}")]
    WizardTransition(String),

    /// Crop rectangle is degenerate or outside the source.
    #[error("Invalid crop: {0}")]
    InvalidCrop(String),
}
