//! The set of loaded images, their display order and the selection.
//!
//! Items live in an arena keyed by [`ImageId`]; `order` holds display
//! order. All gestures act on the selected item and are no-ops when the
//! collection is empty.
//!
//! # Live vs committed
//!
//! Each item has a live `transform` and a [`TransformHistory`]. Outside a
//! drag or a deferred update they are equal. During a drag, pointer moves
//! update only the live transform; the history gets one entry when the
//! gesture ends. A [`Commit::Deferred`] update stays pending until
//! [`ImageCollection::commit_pending`] or until the next selection change,
//! gesture, undo or redo commits it. Discrete gestures (wheel, sliders,
//! flips, reset) commit immediately.
//!
//! Ids are unique across every collection in the process, so one
//! [`RenderContext`](crate::RenderContext) can serve several collections.
//! The cache is not told about removals: evict the ids of items returned by
//! [`ImageCollection::remove`] and [`ImageCollection::clear`].

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decode::{display_name, ImageSource};
use crate::mapping::{wheel_zoom_factor, DragSession, Point};
use crate::transform::{Axis, Transform, TransformHistory};

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(0);

/// Stable identifier of a loaded image. Never reused within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImageId(pub u64);

impl ImageId {
    fn next() -> Self {
        Self(NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One loaded image with its placement state.
#[derive(Debug, Clone)]
pub struct ImageItem {
    id: ImageId,
    name: String,
    source: ImageSource,
    transform: Transform,
    history: TransformHistory,
}

impl ImageItem {
    fn new(id: ImageId, name: String, source: ImageSource) -> Self {
        Self {
            id,
            name,
            source,
            transform: Transform::IDENTITY,
            history: TransformHistory::default(),
        }
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    /// File name without its extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    /// Live transform (may run ahead of the history during a drag).
    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn history(&self) -> &TransformHistory {
        &self.history
    }

    fn commit(&mut self, transform: Transform) {
        self.transform = transform;
        self.history.commit(transform);
        debug!(id = self.id.0, entries = self.history.len(), "transform committed");
    }

    /// Commit the live transform if it differs from the history head.
    fn commit_pending(&mut self) -> bool {
        if self.transform == self.history.current() {
            return false;
        }
        self.commit(self.transform);
        true
    }

    /// Copy of the export-relevant state.
    pub fn snapshot(&self) -> BatchItem {
        BatchItem {
            id: self.id,
            name: self.name.clone(),
            source: self.source.clone(),
            transform: self.transform,
        }
    }
}

/// An immutable copy of the export-relevant state of one item.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub id: ImageId,
    pub name: String,
    pub source: ImageSource,
    pub transform: Transform,
}

/// Whether a transform update enters the undo history now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// Record a history entry.
    Yes,
    /// Update the live transform only.
    Deferred,
}

/// Notification sent to subscribers after every observable change.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionEvent {
    Added { id: ImageId, index: usize },
    Removed { id: ImageId, index: usize },
    Cleared { count: usize },
    Selected { index: usize, id: ImageId },
    /// Live transform changed without a history entry.
    TransformChanged { id: ImageId, transform: Transform },
    /// A history entry was recorded.
    TransformCommitted { id: ImageId, transform: Transform },
    /// Undo or redo moved the history cursor.
    HistoryMoved { id: ImageId, transform: Transform },
}

type Listener = Box<dyn FnMut(&CollectionEvent) + Send>;

#[derive(Debug, Clone, Copy)]
struct ActiveDrag {
    id: ImageId,
    session: DragSession,
}

/// Ordered image list with a selection and per-image transform state.
#[derive(Default)]
pub struct ImageCollection {
    items: HashMap<ImageId, ImageItem>,
    order: Vec<ImageId>,
    selected: usize,
    drag: Option<ActiveDrag>,
    /// Item with a deferred, not yet committed live transform.
    deferred: Option<ImageId>,
    listeners: Vec<Listener>,
    revision: u64,
}

impl fmt::Debug for ImageCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageCollection")
            .field("order", &self.order)
            .field("selected", &self.selected)
            .field("dragging", &self.drag.is_some())
            .field("deferred", &self.deferred)
            .field("listeners", &self.listeners.len())
            .field("revision", &self.revision)
            .finish()
    }
}

impl ImageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    /// Append an image. The selection does not move.
    pub fn add(&mut self, file_name: &str, source: ImageSource) -> ImageId {
        let id = ImageId::next();

        let item = ImageItem::new(id, display_name(file_name).to_string(), source);
        self.items.insert(id, item);
        self.order.push(id);

        let index = self.order.len() - 1;
        self.emit(CollectionEvent::Added { id, index });
        id
    }

    /// Remove the item at `index`, clamping the selection into range.
    ///
    /// Pending state of the removed item is dropped; a drag or deferred
    /// update on any other item is committed first.
    pub fn remove(&mut self, index: usize) -> Option<ImageItem> {
        if index >= self.order.len() {
            return None;
        }
        let id = self.order.remove(index);
        if self.drag.is_some_and(|d| d.id == id) {
            self.drag = None;
        }
        if self.deferred == Some(id) {
            self.deferred = None;
        }
        self.settle();
        let item = self.items.remove(&id);

        if self.selected >= self.order.len() {
            self.selected = self.order.len().saturating_sub(1);
        }
        self.emit(CollectionEvent::Removed { id, index });
        item
    }

    pub fn remove_current(&mut self) -> Option<ImageItem> {
        if self.order.is_empty() {
            return None;
        }
        self.remove(self.selected)
    }

    /// Remove everything and reset the selection. Returns the removed items
    /// in display order.
    pub fn clear(&mut self) -> Vec<ImageItem> {
        self.drag = None;
        self.deferred = None;
        self.selected = 0;
        let removed: Vec<ImageItem> = self
            .order
            .drain(..)
            .filter_map(|id| self.items.remove(&id))
            .collect();
        self.emit(CollectionEvent::Cleared {
            count: removed.len(),
        });
        removed
    }

    /// Select the item at `index`. Out of range is a no-op.
    ///
    /// An unfinished drag or deferred update is committed to its own item.
    pub fn select(&mut self, index: usize) -> bool {
        let Some(&id) = self.order.get(index) else {
            return false;
        };
        self.settle();
        if self.selected != index {
            self.selected = index;
            self.emit(CollectionEvent::Selected { index, id });
        }
        true
    }

    pub fn current(&self) -> Option<&ImageItem> {
        self.order.get(self.selected).and_then(|id| self.items.get(id))
    }

    pub fn get(&self, id: ImageId) -> Option<&ImageItem> {
        self.items.get(&id)
    }

    /// Display position of `id`.
    pub fn index_of(&self, id: ImageId) -> Option<usize> {
        self.order.iter().position(|&other| other == id)
    }

    /// Items in display order.
    pub fn iter(&self) -> impl Iterator<Item = &ImageItem> + '_ {
        self.order.iter().filter_map(|id| self.items.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Copies of every item's export state, in display order.
    pub fn snapshot(&self) -> Vec<BatchItem> {
        self.iter().map(ImageItem::snapshot).collect()
    }

    // ------------------------------------------------------------------
    // Gestures on the current item
    // ------------------------------------------------------------------

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Start a drag at `pointer` (preview units).
    pub fn pointer_down(&mut self, pointer: Point) -> bool {
        self.settle();
        let Some(item) = self.current() else {
            return false;
        };
        self.drag = Some(ActiveDrag {
            id: item.id,
            session: DragSession::begin(pointer, &item.transform),
        });
        true
    }

    /// Move the live transform with the pointer. Nothing is committed.
    pub fn pointer_move(&mut self, pointer: Point) -> Option<Transform> {
        let drag = self.drag?;
        let item = self.items.get_mut(&drag.id)?;
        let moved = drag.session.apply(item.transform, pointer);
        if moved == item.transform {
            return Some(moved);
        }
        item.transform = moved;
        self.emit(CollectionEvent::TransformChanged {
            id: drag.id,
            transform: moved,
        });
        Some(moved)
    }

    /// End the drag, committing one history entry if the image moved.
    pub fn pointer_up(&mut self) -> bool {
        self.settle()
    }

    /// One wheel tick: zoom out for positive `delta_y`, in otherwise.
    pub fn wheel(&mut self, delta_y: f64) -> Option<Transform> {
        self.commit_with(|t| t.zoomed(wheel_zoom_factor(delta_y)))
    }

    pub fn set_scale(&mut self, scale: f64) -> Option<Transform> {
        self.commit_with(|t| t.with_scale(scale))
    }

    pub fn set_rotation(&mut self, degrees: f64) -> Option<Transform> {
        self.commit_with(|t| t.with_rotation(degrees))
    }

    pub fn toggle_flip(&mut self, axis: Axis) -> Option<Transform> {
        self.commit_with(|t| t.flipped(axis))
    }

    /// Commit the identity transform.
    pub fn reset(&mut self) -> Option<Transform> {
        self.commit_with(|_| Transform::IDENTITY)
    }

    /// Replace the current item's transform.
    ///
    /// A deferred update leaves the history alone until it is committed.
    pub fn update(&mut self, transform: Transform, commit: Commit) -> Option<Transform> {
        match commit {
            Commit::Yes => self.commit_with(|_| transform),
            Commit::Deferred => {
                let id = self.current()?.id;
                let item = self.items.get_mut(&id)?;
                item.transform = transform;
                self.deferred = Some(id);
                self.emit(CollectionEvent::TransformChanged { id, transform });
                Some(transform)
            }
        }
    }

    /// Commit a pending drag or deferred update.
    pub fn commit_pending(&mut self) -> bool {
        self.settle()
    }

    pub fn undo(&mut self) -> Option<Transform> {
        self.move_history(TransformHistory::undo)
    }

    pub fn redo(&mut self) -> Option<Transform> {
        self.move_history(TransformHistory::redo)
    }

    pub fn can_undo(&self) -> bool {
        self.current().is_some_and(|i| i.history.can_undo())
    }

    pub fn can_redo(&self) -> bool {
        self.current().is_some_and(|i| i.history.can_redo())
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Register a listener called after every observable change.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&CollectionEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Counter bumped on every observable change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn emit(&mut self, event: CollectionEvent) {
        self.revision += 1;
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// End any active drag and deferred update, committing each affected
    /// item whose live transform moved away from its history head.
    fn settle(&mut self) -> bool {
        let dragged = self.drag.take().map(|d| d.id);
        let deferred = self.deferred.take().filter(|&id| Some(id) != dragged);
        let mut committed = false;
        for id in dragged.into_iter().chain(deferred) {
            committed |= self.commit_pending_for(id);
        }
        committed
    }

    fn commit_pending_for(&mut self, id: ImageId) -> bool {
        let Some(item) = self.items.get_mut(&id) else {
            return false;
        };
        if !item.commit_pending() {
            return false;
        }
        let transform = item.transform;
        self.emit(CollectionEvent::TransformCommitted { id, transform });
        true
    }

    fn commit_with(&mut self, f: impl FnOnce(Transform) -> Transform) -> Option<Transform> {
        self.settle();
        let id = self.current()?.id;
        let item = self.items.get_mut(&id)?;
        let transform = f(item.transform);
        item.commit(transform);
        self.emit(CollectionEvent::TransformCommitted { id, transform });
        Some(transform)
    }

    fn move_history(
        &mut self,
        step: fn(&mut TransformHistory) -> Option<Transform>,
    ) -> Option<Transform> {
        self.settle();
        let id = self.current()?.id;
        let item = self.items.get_mut(&id)?;
        let transform = step(&mut item.history)?;
        item.transform = transform;
        self.emit(CollectionEvent::HistoryMoved { id, transform });
        Some(transform)
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
