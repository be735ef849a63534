//! Atlas texture sources and the batch-invalidation protocol
//!
//! A batch holder depends on the pages of one or more texture atlases. The
//! atlas may reallocate, resize, or destroy those pages at any time, so
//! holders register themselves as listeners and are notified synchronously:
//!
//! - page storage was thrown away entirely ([`AtlasListener::on_atlas_cleared`]),
//! - a page was replaced by a resized copy
//!   ([`AtlasListener::on_atlas_layer_changed`]),
//! - the atlas itself is going away ([`AtlasListener::on_atlas_released`]).
//!
//! The registration list is owned by the atlas side and holds only
//! non-owning entries; a holder that goes away is pruned on the next
//! notification, and a holder that answers `false` is unregistered without
//! affecting other listeners.
//!
//! Callbacks are synchronous and reentrant-unsafe: a callback must not
//! mutate the notifying atlas's listener list. Holders unregister before
//! rebuilding, never from inside a callback.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Identifier of an atlas object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtlasId(u64);

impl AtlasId {
    /// Create an identifier from its raw value
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identifier value
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Identifier of one backing texture (an atlas page)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(u64);

impl TextureId {
    /// Create an identifier from its raw value
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identifier value
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// One atlas page: backing texture plus its current pixel size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TexturePage {
    /// Backing texture
    pub texture: TextureId,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl TexturePage {
    /// Create a page record
    pub const fn new(texture: TextureId, width: u32, height: u32) -> Self {
        Self {
            texture,
            width,
            height,
        }
    }

    /// Pixel size as (width, height)
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Callback contract for holders of atlas-dependent batches
pub trait AtlasListener {
    /// All pages of `atlas` were invalidated; dependent batches must be
    /// fully cleared. Returns whether this holder keeps listening.
    fn on_atlas_cleared(&mut self, atlas: AtlasId) -> bool;

    /// A page of `atlas` was replaced by a resized copy. Positions remain
    /// valid; UV normalization must be rescaled by old size / new size.
    /// Returns whether this holder keeps listening.
    fn on_atlas_layer_changed(&mut self, atlas: AtlasId, old: TexturePage, new: TexturePage)
        -> bool;

    /// `atlas` is being destroyed; dependent batches must be cleared and
    /// the registration dropped. Listening necessarily ends.
    fn on_atlas_released(&mut self, atlas: AtlasId);
}

/// Shared, mutable listener reference
pub type SharedListener = Rc<RefCell<dyn AtlasListener>>;

/// Non-owning listener registration entry
pub type WeakListener = Weak<RefCell<dyn AtlasListener>>;

/// Atlas-side listener registration list
///
/// Concrete atlas implementations embed one of these and forward their
/// mutations through the `notify_*` methods.
#[derive(Debug, Default)]
pub struct ListenerSet {
    listeners: Vec<WeakListener>,
}

impl ListenerSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; duplicates of an already-registered holder are
    /// ignored
    pub fn add(&mut self, listener: WeakListener) {
        if !self.listeners.iter().any(|entry| entry.ptr_eq(&listener)) {
            self.listeners.push(listener);
        }
    }

    /// Unregister a listener; unknown entries are ignored
    pub fn remove(&mut self, listener: &WeakListener) {
        self.listeners.retain(|entry| !entry.ptr_eq(listener));
    }

    /// Number of live registrations
    pub fn len(&self) -> usize {
        self.listeners
            .iter()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }

    /// Whether no live registrations remain
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Notify every listener that all pages were invalidated
    ///
    /// Listeners answering `false`, and dead entries, are unregistered.
    pub fn notify_cleared(&mut self, atlas: AtlasId) {
        self.listeners.retain(|entry| match entry.upgrade() {
            Some(listener) => listener.borrow_mut().on_atlas_cleared(atlas),
            None => false,
        });
    }

    /// Notify every listener that a page was replaced by a resized copy
    pub fn notify_layer_changed(&mut self, atlas: AtlasId, old: TexturePage, new: TexturePage) {
        self.listeners.retain(|entry| match entry.upgrade() {
            Some(listener) => listener.borrow_mut().on_atlas_layer_changed(atlas, old, new),
            None => false,
        });
    }

    /// Notify every listener that the atlas is being destroyed and drop all
    /// registrations
    pub fn notify_released(&mut self, atlas: AtlasId) {
        for entry in self.listeners.drain(..) {
            if let Some(listener) = entry.upgrade() {
                listener.borrow_mut().on_atlas_released(atlas);
            }
        }
    }
}

/// Contract an atlas implementation satisfies toward batch holders
pub trait AtlasSource {
    /// Identifier of this atlas
    fn id(&self) -> AtlasId;

    /// Register a batch holder for mutation notifications
    fn add_listener(&mut self, listener: WeakListener);

    /// Unregister a previously registered batch holder
    fn remove_listener(&mut self, listener: &WeakListener);
}

/// Shared, mutable atlas reference
pub type SharedAtlas = Rc<RefCell<dyn AtlasSource>>;

/// Non-owning atlas reference held by batch holders
pub type WeakAtlas = Weak<RefCell<dyn AtlasSource>>;
