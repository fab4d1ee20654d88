//! Concurrent decode of every image placed in a scene.
//!
//! Each source is decoded on the blocking pool; the caller waits for all of
//! them to settle before anything is drawn. A failed decode is logged and
//! the image is left out.

use std::collections::HashMap;

use futures::future::join_all;
use mugsmith_core::{ElementId, ElementKind, ImageHandle, Scene};
use tiny_skia::Pixmap;

use crate::error::RenderResult;
use crate::texture::decode_image_with_hint;

/// Decoded bitmaps keyed by element.
#[derive(Debug, Default)]
pub struct DecodedImages {
    bitmaps: HashMap<ElementId, Pixmap>,
    failed: Vec<ElementId>,
}

impl DecodedImages {
    /// Bitmap for an image element, if it decoded.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Pixmap> {
        self.bitmaps.get(&id)
    }

    /// Number of successfully decoded images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bitmaps.len()
    }

    /// True when nothing decoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bitmaps.is_empty()
    }

    /// Elements whose source failed to decode.
    #[must_use]
    pub fn failed(&self) -> &[ElementId] {
        &self.failed
    }
}

fn decode_to_pixmap(handle: &ImageHandle) -> RenderResult<Pixmap> {
    decode_image_with_hint(handle.bytes(), handle.mime_type())?.to_pixmap()
}

/// Decode every image element of `scene` concurrently and wait for all of
/// them to settle.
///
/// Resolves immediately when the scene has no images. Never fails: images
/// that cannot be decoded are reported in [`DecodedImages::failed`].
pub async fn decode_scene_images(scene: &Scene) -> DecodedImages {
    let jobs: Vec<(ElementId, ImageHandle)> = scene
        .elements()
        .filter_map(|element| match &element.kind {
            ElementKind::Image { source } => Some((element.id, source.clone())),
            ElementKind::Text { .. } => None,
        })
        .collect();

    let mut decoded = DecodedImages::default();
    if jobs.is_empty() {
        return decoded;
    }

    let pending = jobs.into_iter().map(|(id, handle)| async move {
        let result = tokio::task::spawn_blocking(move || decode_to_pixmap(&handle)).await;
        (id, result)
    });

    for (id, result) in join_all(pending).await {
        match result {
            Ok(Ok(pixmap)) => {
                decoded.bitmaps.insert(id, pixmap);
            }
            Ok(Err(e)) => {
                tracing::warn!(%id, error = %e, "image decode failed, skipping");
                decoded.failed.push(id);
            }
            Err(e) => {
                tracing::warn!(%id, error = %e, "image decode task did not complete, skipping");
                decoded.failed.push(id);
            }
        }
    }

    tracing::debug!(
        decoded = decoded.len(),
        failed = decoded.failed.len(),
        "scene images decoded"
    );
    decoded
}
