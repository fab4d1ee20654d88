//! Client-side upload pre-check.
//!
//! Runs before an image is placed or sent anywhere, so an oversized or
//! non-image file never reaches the network.

use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::error::{CanvasError, CanvasResult};

/// Media types accepted by default.
pub const DEFAULT_ALLOWED_TYPES: &[&str] = &["image/png", "image/jpeg", "image/webp", "image/gif"];

/// Size and type ceiling for uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Largest accepted payload in bytes.
    pub max_bytes: usize,
    /// Accepted media types. An entry ending in `/*` accepts the whole family.
    pub allowed_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::with_limit(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

impl UploadPolicy {
    /// Default media types with a custom size ceiling.
    #[must_use]
    pub fn with_limit(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            allowed_types: DEFAULT_ALLOWED_TYPES.iter().map(ToString::to_string).collect(),
        }
    }

    /// Validate an upload of `len` bytes with optional media type.
    ///
    /// A missing media type is accepted; the decoder sniffs the format later.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::UploadTooLarge`] or
    /// [`CanvasError::UnsupportedUpload`].
    pub fn check(&self, len: usize, mime_type: Option<&str>) -> CanvasResult<()> {
        if len > self.max_bytes {
            tracing::warn!(len, limit = self.max_bytes, "upload rejected: too large");
            return Err(CanvasError::UploadTooLarge {
                size: len,
                limit: self.max_bytes,
            });
        }
        if len == 0 {
            return Err(CanvasError::UnsupportedUpload("empty file".into()));
        }

        if let Some(mime) = mime_type {
            let mime = mime.split(';').next().unwrap_or(mime).trim().to_ascii_lowercase();
            if !self.allows(&mime) {
                tracing::warn!(%mime, "upload rejected: unsupported type");
                return Err(CanvasError::UnsupportedUpload(mime));
            }
        }
        Ok(())
    }

    fn allows(&self, mime: &str) -> bool {
        self.allowed_types.iter().any(|allowed| {
            allowed
                .strip_suffix("/*")
                .map_or(allowed == mime, |family| {
                    mime.split('/').next() == Some(family)
                })
        })
    }
}
