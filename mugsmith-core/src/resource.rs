//! Scoped ownership of raw image sources.
//!
//! Every placed image owns an [`ImageHandle`]. Handles are cheap to clone (the
//! bytes are shared) and the underlying resource is released exactly once,
//! when the last handle is dropped. Because release happens in `Drop`, it is
//! guaranteed on every destruction path: explicit delete, scene clear, session
//! teardown, or unwinding out of an error.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Identifier of a loaded image resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "res-{}", self.0)
    }
}

#[derive(Debug, Default)]
struct TrackerInner {
    next_id: AtomicU64,
    live: AtomicUsize,
    released: AtomicUsize,
}

/// Counts acquired and released image resources for one editing session.
#[derive(Debug, Clone, Default)]
pub struct ResourceTracker {
    inner: Arc<TrackerInner>,
}

impl ResourceTracker {
    /// Create a new tracker with no live resources.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of loaded image bytes.
    #[must_use]
    pub fn acquire(&self, bytes: Vec<u8>, mime_type: Option<String>) -> ImageHandle {
        let id = ResourceId(self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.inner.live.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(%id, len = bytes.len(), "acquired image resource");
        ImageHandle {
            resource: Arc::new(ImageResource {
                id,
                bytes,
                mime_type,
                tracker: Arc::clone(&self.inner),
            }),
        }
    }

    /// Number of resources acquired but not yet released.
    #[must_use]
    pub fn live(&self) -> usize {
        self.inner.live.load(Ordering::Relaxed)
    }

    /// Number of resources released so far.
    #[must_use]
    pub fn released(&self) -> usize {
        self.inner.released.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
struct ImageResource {
    id: ResourceId,
    bytes: Vec<u8>,
    mime_type: Option<String>,
    tracker: Arc<TrackerInner>,
}

impl Drop for ImageResource {
    fn drop(&mut self) {
        self.tracker.live.fetch_sub(1, Ordering::Relaxed);
        self.tracker.released.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(id = %self.id, "released image resource");
    }
}

/// Shared, owned reference to the raw bytes of a loaded image.
///
/// The compositor decodes from these bytes and never goes back to disk or
/// network.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    resource: Arc<ImageResource>,
}

impl ImageHandle {
    /// Resource identifier.
    #[must_use]
    pub fn id(&self) -> ResourceId {
        self.resource.id
    }

    /// Raw encoded bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.resource.bytes
    }

    /// Length of the encoded bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resource.bytes.len()
    }

    /// Whether the source is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resource.bytes.is_empty()
    }

    /// Declared MIME type, if known.
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.resource.mime_type.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_on_last_drop() {
        let tracker = ResourceTracker::new();
        let handle = tracker.acquire(vec![1, 2, 3], Some("image/png".into()));
        let shared = handle.clone();
        assert_eq!(tracker.live(), 1);

        drop(handle);
        assert_eq!(tracker.live(), 1);
        assert_eq!(shared.bytes(), &[1, 2, 3]);

        drop(shared);
        assert_eq!(tracker.live(), 0);
        assert_eq!(tracker.released(), 1);
    }

    #[test]
    fn test_ids_are_distinct() {
        let tracker = ResourceTracker::new();
        let a = tracker.acquire(vec![], None);
        let b = tracker.acquire(vec![], None);
        assert_ne!(a.id(), b.id());
        assert!(a.is_empty());
        assert_eq!(b.mime_type(), None);
    }

    #[test]
    fn test_release_on_unwind() {
        let tracker = ResourceTracker::new();
        let inner = tracker.clone();
        let result = std::panic::catch_unwind(move || {
            let _handle = inner.acquire(vec![0; 16], None);
            panic!("unmount path");
        });
        assert!(result.is_err());
        assert_eq!(tracker.live(), 0);
    }
}
