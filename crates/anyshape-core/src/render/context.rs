//! Explicit rendering context: preview reference size plus decoded-image cache.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::collection::ImageId;
use crate::decode::{decode_source, DecodeError, DecodedImage, ImageSource};
use crate::mapping::PREVIEW_REFERENCE_SIZE;

/// Shared cache of decoded images keyed by item id.
///
/// Each id is decoded at most once and never mutated afterwards. Ids are
/// unique per process, so one cache can serve several collections. The
/// collection does not evict: whoever removes an item evicts its id.
#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    inner: Arc<RwLock<HashMap<ImageId, Arc<DecodedImage>>>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ImageId) -> Option<Arc<DecodedImage>> {
        self.inner.read().get(&id).cloned()
    }

    /// Return the cached image for `id`, decoding `source` on a miss.
    ///
    /// Decoding runs without holding the lock. When two callers race on the
    /// same id, the first insert wins and both get the same `Arc`.
    pub fn get_or_decode(
        &self,
        id: ImageId,
        source: &ImageSource,
    ) -> Result<Arc<DecodedImage>, DecodeError> {
        if let Some(hit) = self.get(id) {
            return Ok(hit);
        }

        let decoded = Arc::new(decode_source(source)?);
        let mut map = self.inner.write();
        let entry = map.entry(id).or_insert_with(|| {
            debug!(id = id.0, width = decoded.width, height = decoded.height, "cached decode");
            Arc::clone(&decoded)
        });
        Ok(Arc::clone(entry))
    }

    /// Insert an already decoded image unless one is cached for `id`.
    pub fn insert(&self, id: ImageId, image: DecodedImage) -> Arc<DecodedImage> {
        let mut map = self.inner.write();
        Arc::clone(map.entry(id).or_insert_with(|| Arc::new(image)))
    }

    pub fn evict(&self, id: ImageId) {
        if self.inner.write().remove(&id).is_some() {
            debug!(id = id.0, "evicted decode");
        }
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    pub fn contains(&self, id: ImageId) -> bool {
        self.inner.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

/// Everything a render needs beyond the per-call inputs.
///
/// Cloning shares the cache.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Side of preview space that translations are measured in
    pub reference_size: f64,
    pub cache: ImageCache,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderContext {
    pub fn new() -> Self {
        Self::with_reference_size(PREVIEW_REFERENCE_SIZE)
    }

    /// Context with a custom preview reference size. Non-positive sizes
    /// fall back to [`PREVIEW_REFERENCE_SIZE`].
    pub fn with_reference_size(reference_size: f64) -> Self {
        let reference_size = if reference_size.is_finite() && reference_size > 0.0 {
            reference_size
        } else {
            PREVIEW_REFERENCE_SIZE
        };
        Self {
            reference_size,
            cache: ImageCache::new(),
        }
    }
}
