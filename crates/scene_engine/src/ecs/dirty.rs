//! Dirty and kill tracking
//!
//! Two independent bitsets keyed by entity id: entities pending system
//! re-evaluation and entities pending destruction. Both support ascending
//! iteration and a whole-pass reset, mirroring how the update pass drains
//! them.

use super::EntityId;
use crate::foundation::collections::BitSet;

/// Pending-work bitsets for the world update pass
#[derive(Debug, Default)]
pub struct DirtyTracker {
    dirty: BitSet,
    killed: BitSet,
}

impl DirtyTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an entity for system re-evaluation (idempotent)
    pub fn mark_dirty(&mut self, id: EntityId) {
        self.dirty.insert(id.raw());
    }

    /// Mark an entity for deferred destruction (idempotent)
    pub fn mark_killed(&mut self, id: EntityId) {
        self.killed.insert(id.raw());
    }

    /// The dirty set
    pub fn dirty(&self) -> &BitSet {
        &self.dirty
    }

    /// The kill set
    pub fn killed(&self) -> &BitSet {
        &self.killed
    }

    /// Iterate entities marked dirty, in ascending id order
    pub fn dirty_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.dirty.iter().map(EntityId::new)
    }

    /// Iterate entities marked killed, in ascending id order
    pub fn killed_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.killed.iter().map(EntityId::new)
    }

    /// Clear the dirty set; called once after a full dirty pass
    pub fn reset_dirty(&mut self) {
        self.dirty.clear();
    }

    /// Clear the kill set; called once after a full kill pass
    pub fn reset_killed(&mut self) {
        self.killed.clear();
    }

    /// Clear both sets
    pub fn reset(&mut self) {
        self.dirty.clear();
        self.killed.clear();
    }
}
