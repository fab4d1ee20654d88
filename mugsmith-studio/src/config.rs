//! Client configuration from the environment.

use std::time::Duration;

use mugsmith_core::{UploadPolicy, DEFAULT_MAX_UPLOAD_BYTES};
use url::Url;

use crate::error::{StudioError, StudioResult};

/// Default storefront base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Storefront client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioConfig {
    /// Base URL; endpoint paths are resolved against it.
    pub api_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Upload ceiling enforced before any request is made.
    pub max_upload_bytes: usize,
}

impl StudioConfig {
    /// Configuration for `api_url` with default timeout and ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::InvalidUrl`] if `api_url` does not parse.
    pub fn new(api_url: &str) -> StudioResult<Self> {
        Ok(Self {
            api_url: parse_base(api_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        })
    }

    /// Read `MUGSMITH_API_URL`, `MUGSMITH_TIMEOUT_SECS` and
    /// `MUGSMITH_MAX_UPLOAD_BYTES`, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::InvalidUrl`] if `MUGSMITH_API_URL` is set but
    /// malformed.
    pub fn from_env() -> StudioResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`StudioConfig::from_env`] with a custom variable source.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::InvalidUrl`] for a malformed URL.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> StudioResult<Self> {
        let api_url = lookup("MUGSMITH_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let mut config = Self::new(api_url.trim())?;

        if let Some(secs) = parsed(&lookup, "MUGSMITH_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(bytes) = parsed(&lookup, "MUGSMITH_MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = bytes;
        }
        Ok(config)
    }

    /// Upload pre-check matching this configuration.
    #[must_use]
    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy::with_limit(self.max_upload_bytes)
    }
}

/// Parse a base URL, giving its path a trailing slash so relative joins
/// extend it instead of replacing the last segment.
fn parse_base(raw: &str) -> StudioResult<Url> {
    let mut url = Url::parse(raw).map_err(|e| StudioError::InvalidUrl(format!("{raw}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(StudioError::InvalidUrl(format!("{raw}: not a base URL")));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable setting");
            None
        }
    }
}
