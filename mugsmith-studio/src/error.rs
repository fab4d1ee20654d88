//! Storefront client errors.

use mugsmith_core::CanvasError;
use thiserror::Error;

/// Result type for storefront operations.
pub type StudioResult<T> = Result<T, StudioError>;

/// Errors that can occur when talking to the storefront API.
#[derive(Debug, Error)]
pub enum StudioError {
    /// The configured base URL or a derived endpoint is invalid.
    #[error("invalid storefront URL: {0}")]
    InvalidUrl(String),

    /// HTTP layer failed (connection, timeout, etc.).
    #[error("storefront HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("storefront returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// JSON parsing failed unexpectedly.
    #[error("failed to parse storefront payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The server reported `success: false` or an unusable payload.
    #[error("storefront API error: {0}")]
    Api(String),

    /// The upload was refused locally; no request was sent.
    #[error("upload rejected: {0}")]
    Rejected(#[from] CanvasError),
}

impl StudioError {
    /// True for failures a user may reasonably retry by hand.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let server = StudioError::Status {
            status: 503,
            body: String::new(),
        };
        assert!(server.is_transient());

        let client = StudioError::Status {
            status: 404,
            body: "missing".into(),
        };
        assert!(!client.is_transient());
        assert!(!StudioError::Api("generation failed".into()).is_transient());
        assert!(!StudioError::Rejected(CanvasError::UploadTooLarge { size: 3, limit: 2 })
            .is_transient());
    }
}
