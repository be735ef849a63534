//! Entity slot storage
//!
//! Fixed-slot arena owning every entity record plus the dense list of
//! currently alive handles. Identifiers come from an [`IndexPool`] so slots
//! are recycled and the id range stays dense.

use super::{Entity, EntityHandle, EntityId};
use crate::foundation::collections::IndexPool;

/// Arena of entity slots and the alive-handle list
///
/// The store is the only writer of entity liveness. Destruction bumps the
/// slot generation, which invalidates every outstanding [`EntityHandle`]
/// for that slot without dangling.
#[derive(Debug, Default)]
pub struct EntityStore {
    slots: Vec<Entity>,
    alive: Vec<EntityHandle>,
    pool: IndexPool,
}

impl EntityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with room for `capacity` entities
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            alive: Vec::with_capacity(capacity),
            pool: IndexPool::new(),
        }
    }

    /// Create a new live entity and return its handle
    ///
    /// Reuses a freed slot when one exists, otherwise grows slot storage by
    /// one. The returned handle is reference-stable for the entity's whole
    /// lifetime.
    pub fn create(&mut self) -> EntityHandle {
        let raw = self.pool.allocate();
        let id = EntityId::new(raw);
        if id.index() == self.slots.len() {
            self.slots.push(Entity::new(id));
        }
        debug_assert!(id.index() < self.slots.len(), "slot index out of range");

        let alive_index = self.alive.len();
        let slot = &mut self.slots[id.index()];
        slot.alive = true;
        slot.alive_index = alive_index;
        slot.components = super::ComponentMask::EMPTY;
        slot.enabled = true;

        let handle = slot.handle();
        self.alive.push(handle);
        handle
    }

    /// Handle for a live entity id
    ///
    /// An id that is out of range or refers to a dead slot is reported
    /// through the log and yields [`EntityHandle::INVALID`]; no error is
    /// propagated past this boundary.
    pub fn lookup(&self, id: EntityId) -> EntityHandle {
        match self.slots.get(id.index()) {
            Some(slot) if slot.alive => self.alive[slot.alive_index],
            _ => {
                log::error!("invalid entity id {id}");
                EntityHandle::INVALID
            }
        }
    }

    /// Whether `handle` still refers to a live entity
    pub fn is_valid(&self, handle: EntityHandle) -> bool {
        self.slots
            .get(handle.id().index())
            .is_some_and(|slot| slot.alive && slot.generation == handle.generation())
    }

    /// Entity record behind a valid handle
    pub fn get(&self, handle: EntityHandle) -> Option<&Entity> {
        self.slots
            .get(handle.id().index())
            .filter(|slot| slot.alive && slot.generation == handle.generation())
    }

    /// Mutable entity record behind a valid handle
    pub(crate) fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut Entity> {
        self.slots
            .get_mut(handle.id().index())
            .filter(|slot| slot.alive && slot.generation == handle.generation())
    }

    /// Entity record for a live id
    pub(crate) fn live(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id.index()).filter(|slot| slot.alive)
    }

    /// Destroy the entity in slot `id`
    ///
    /// Returns the id to the pool, invalidates outstanding handles by
    /// bumping the slot generation, then removes the alive-list entry via
    /// swap-with-last, patching the swapped entity's recorded index. The
    /// swap only ever touches the tail, so callers destroying several
    /// entities must do so in ascending id order.
    pub(crate) fn destroy(&mut self, id: EntityId) {
        debug_assert!(id.index() < self.slots.len(), "entity index out of range");

        self.pool.free(id.raw());

        let slot = &mut self.slots[id.index()];
        debug_assert!(slot.alive, "entity must be alive");
        slot.alive = false;
        slot.generation = slot.generation.wrapping_add(1);
        slot.components = super::ComponentMask::EMPTY;
        let alive_index = slot.alive_index;

        debug_assert!(alive_index < self.alive.len(), "alive index out of range");
        let last = self.alive.len() - 1;
        if alive_index < last {
            let moved = self.alive[last];
            self.alive[alive_index] = moved;
            self.slots[moved.id().index()].alive_index = alive_index;
        }
        self.alive.pop();
    }

    /// Destroy every entity, invalidating all handles
    ///
    /// Entities are destroyed before the handle storage is released so no
    /// handle is ever observed in a half-dead state during teardown.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if slot.alive {
                slot.alive = false;
                slot.generation = slot.generation.wrapping_add(1);
                slot.components = super::ComponentMask::EMPTY;
            }
        }
        self.alive.clear();
        self.pool.reset();
    }

    /// Handles of all currently alive entities, in alive-list order
    pub fn alive_handles(&self) -> &[EntityHandle] {
        &self.alive
    }

    /// Number of alive entities
    pub fn len(&self) -> usize {
        self.alive.len()
    }

    /// Whether no entities are alive
    pub fn is_empty(&self) -> bool {
        self.alive.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_lookup() {
        let mut store = EntityStore::new();
        let handle = store.create();
        assert!(store.is_valid(handle));
        assert_eq!(store.lookup(handle.id()), handle);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_lookup_invalid_id_returns_invalid_handle() {
        let store = EntityStore::new();
        assert_eq!(store.lookup(EntityId::new(42)), EntityHandle::INVALID);
    }

    #[test]
    fn test_destroy_invalidates_handle() {
        let mut store = EntityStore::new();
        let handle = store.create();
        store.destroy(handle.id());
        assert!(!store.is_valid(handle));
        assert!(store.get(handle).is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_recycled_slot_does_not_validate_old_handle() {
        let mut store = EntityStore::new();
        let old = store.create();
        store.destroy(old.id());
        let new = store.create();
        assert_eq!(new.id(), old.id());
        assert!(store.is_valid(new));
        assert!(!store.is_valid(old));
    }

    #[test]
    fn test_swap_removal_patches_moved_index() {
        let mut store = EntityStore::new();
        let a = store.create();
        let b = store.create();
        let c = store.create();

        store.destroy(a.id());

        // c was swapped into a's position; its lookup must still resolve.
        assert_eq!(store.lookup(c.id()), c);
        assert_eq!(store.alive_handles(), &[c, b]);

        store.destroy(c.id());
        assert_eq!(store.alive_handles(), &[b]);
        assert_eq!(store.lookup(b.id()), b);
    }

    #[test]
    fn test_clear_invalidates_everything() {
        let mut store = EntityStore::new();
        let a = store.create();
        let b = store.create();
        store.clear();
        assert!(store.is_empty());
        assert!(!store.is_valid(a));
        assert!(!store.is_valid(b));

        // Slots are recycled from id 0 with fresh generations.
        let again = store.create();
        assert_eq!(again.id().raw(), 0);
        assert!(!store.is_valid(a));
        assert!(store.is_valid(again));
    }
}
