//! World orchestration
//!
//! [`World`] ties together the entity store, the dirty/kill tracker, and
//! the system registry. Client code creates, mutates, and kills entities at
//! any time; the single [`World::update`] pass then reconciles everything:
//! kill processing first, system membership second, both in ascending id
//! order.

use serde::{Deserialize, Serialize};

use super::{
    ComponentMask, DirtyTracker, Entity, EntityHandle, EntityId, System, SystemRegistry,
};
use super::storage::EntityStore;

/// Tuning knobs for world construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Entity slots reserved up front
    pub initial_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 256,
        }
    }
}

/// Entity world: store, tracker, and systems behind one update pass
#[derive(Debug, Default)]
pub struct World {
    store: EntityStore,
    tracker: DirtyTracker,
    registry: SystemRegistry,
}

impl World {
    /// Create an empty world with default configuration
    pub fn new() -> Self {
        Self::with_config(&WorldConfig::default())
    }

    /// Create an empty world with the given configuration
    pub fn with_config(config: &WorldConfig) -> Self {
        Self {
            store: EntityStore::with_capacity(config.initial_capacity),
            tracker: DirtyTracker::new(),
            registry: SystemRegistry::new(),
        }
    }

    /// Create a new entity
    ///
    /// The entity is born dirty so every system evaluates it on the next
    /// [`World::update`].
    pub fn create_entity(&mut self) -> EntityHandle {
        let handle = self.store.create();
        self.tracker.mark_dirty(handle.id());
        handle
    }

    /// Mark an entity for destruction on the next [`World::update`]
    ///
    /// Ignored if the handle is invalid.
    pub fn kill_entity(&mut self, handle: EntityHandle) {
        if self.store.is_valid(handle) {
            self.tracker.mark_killed(handle.id());
        }
    }

    /// Handle for a live entity id
    ///
    /// An invalid id is reported through the log and yields
    /// [`EntityHandle::INVALID`].
    pub fn entity(&self, id: EntityId) -> EntityHandle {
        self.store.lookup(id)
    }

    /// Whether `handle` still refers to a live entity
    pub fn is_valid(&self, handle: EntityHandle) -> bool {
        self.store.is_valid(handle)
    }

    /// Entity record behind a valid handle
    pub fn get(&self, handle: EntityHandle) -> Option<&Entity> {
        self.store.get(handle)
    }

    /// Attach component kinds to an entity, marking it dirty
    pub fn add_components(&mut self, handle: EntityHandle, mask: ComponentMask) {
        if let Some(entity) = self.store.get_mut(handle) {
            entity.components.insert(mask);
            let id = entity.id();
            self.tracker.mark_dirty(id);
        }
    }

    /// Detach component kinds from an entity, marking it dirty
    pub fn remove_components(&mut self, handle: EntityHandle, mask: ComponentMask) {
        if let Some(entity) = self.store.get_mut(handle) {
            entity.components.remove(mask);
            let id = entity.id();
            self.tracker.mark_dirty(id);
        }
    }

    /// Enable or disable an entity, marking it dirty on change
    pub fn set_enabled(&mut self, handle: EntityHandle, enabled: bool) {
        if let Some(entity) = self.store.get_mut(handle) {
            if entity.enabled != enabled {
                entity.enabled = enabled;
                let id = entity.id();
                self.tracker.mark_dirty(id);
            }
        }
    }

    /// Force system re-evaluation for an entity on the next update
    pub fn mark_dirty(&mut self, handle: EntityHandle) {
        if self.store.is_valid(handle) {
            self.tracker.mark_dirty(handle.id());
        }
    }

    /// Register a system; it is visited after all previously added ones
    pub fn add_system(&mut self, system: Box<dyn System>) {
        self.registry.add(system);
    }

    /// The system registry
    pub fn systems(&self) -> &SystemRegistry {
        &self.registry
    }

    /// The system registry, mutably
    pub fn systems_mut(&mut self) -> &mut SystemRegistry {
        &mut self.registry
    }

    /// Handles of all currently alive entities
    pub fn alive_handles(&self) -> &[EntityHandle] {
        self.store.alive_handles()
    }

    /// Number of alive entities
    pub fn entity_count(&self) -> usize {
        self.store.len()
    }

    /// Destroy all entities, invalidating every handle
    ///
    /// Systems are emptied through their `remove_entity` notification
    /// before the entities are destroyed, so the membership invariant holds
    /// without waiting for an update pass.
    pub fn clear(&mut self) {
        for index in 0..self.store.alive_handles().len() {
            let handle = self.store.alive_handles()[index];
            let Some(entity) = self.store.get(handle) else {
                continue;
            };
            for system in self.registry.iter_mut() {
                if system.has_entity(entity.id()) {
                    system.remove_entity(entity);
                }
            }
        }
        self.store.clear();
        self.tracker.reset();
    }

    /// Reconcile all deferred state
    ///
    /// Phase 1 destroys every entity marked killed, ascending by id: the id
    /// goes back to the pool, the slot is invalidated, then the alive-list
    /// entry is swap-removed. Ascending order plus tail-only swaps keep
    /// every recorded alive index correct with one patch per removal.
    ///
    /// Phase 2 re-evaluates every entity marked dirty, ascending by id,
    /// against every system in registration order; membership changes are
    /// delivered through `add_entity`/`remove_entity`. Entities killed this
    /// pass are skipped, but their dirty bit is still consumed.
    ///
    /// Each bitset is reset only after its phase fully completes.
    pub fn update(&mut self) {
        // Phase 1: kill processing.
        let mut cursor = self.tracker.killed().find_first();
        while let Some(raw) = cursor {
            let id = EntityId::new(raw);
            debug_assert!(
                self.store.live(id).is_some(),
                "killed entity {id} must be alive"
            );
            self.store.destroy(id);
            cursor = self.tracker.killed().find_next(raw);
        }
        self.tracker.reset_killed();

        // Phase 2: dirty processing.
        let mut cursor = self.tracker.dirty().find_first();
        while let Some(raw) = cursor {
            let id = EntityId::new(raw);
            // A kill this pass supersedes the pending dirty mark.
            if let Some(entity) = self.store.live(id) {
                for system in self.registry.iter_mut() {
                    let part_of = system.has_entity(id);
                    if system.filters(entity) != part_of {
                        if part_of {
                            system.remove_entity(entity);
                        } else {
                            system.add_entity(entity);
                        }
                    }
                }
            }
            cursor = self.tracker.dirty().find_next(raw);
        }
        self.tracker.reset_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{EntityList, FilterSpec};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Mask-filtered system that counts membership churn.
    struct TrackingSystem {
        filter: FilterSpec,
        members: EntityList,
        added: Rc<Cell<usize>>,
        removed: Rc<Cell<usize>>,
    }

    impl TrackingSystem {
        fn new(filter: FilterSpec) -> (Box<Self>, Rc<Cell<usize>>, Rc<Cell<usize>>) {
            let added = Rc::new(Cell::new(0));
            let removed = Rc::new(Cell::new(0));
            let system = Box::new(Self {
                filter,
                members: EntityList::new(),
                added: Rc::clone(&added),
                removed: Rc::clone(&removed),
            });
            (system, added, removed)
        }
    }

    impl System for TrackingSystem {
        fn filters(&self, entity: &Entity) -> bool {
            self.filter.matches(entity)
        }

        fn has_entity(&self, id: EntityId) -> bool {
            self.members.contains(id)
        }

        fn add_entity(&mut self, entity: &Entity) {
            self.members.insert(entity.id());
            self.added.set(self.added.get() + 1);
        }

        fn remove_entity(&mut self, entity: &Entity) {
            self.members.remove(entity.id());
            self.removed.set(self.removed.get() + 1);
        }
    }

    const MOVABLE: ComponentMask = ComponentMask::from_bit(0);

    #[test]
    fn test_alive_list_matches_surviving_entities() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();
        let c = world.create_entity();
        world.kill_entity(b);
        world.update();

        let alive = world.alive_handles();
        assert_eq!(alive.len(), 2);
        assert!(alive.contains(&a));
        assert!(alive.contains(&c));
        assert!(!alive.contains(&b));

        // No duplicates.
        let mut ids: Vec<u32> = alive.iter().map(|handle| handle.id().raw()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_freed_id_reused_before_minting() {
        let mut world = World::new();
        let a = world.create_entity();
        let _b = world.create_entity();
        world.kill_entity(a);
        world.update();

        let recycled = world.create_entity();
        assert_eq!(recycled.id(), a.id());
        assert!(!world.is_valid(a));
        assert!(world.is_valid(recycled));
    }

    #[test]
    fn test_destruction_is_deferred_to_update() {
        let mut world = World::new();
        let entity = world.create_entity();
        world.kill_entity(entity);
        assert!(world.is_valid(entity));
        world.update();
        assert!(!world.is_valid(entity));
    }

    #[test]
    fn test_kill_invalid_handle_is_ignored() {
        let mut world = World::new();
        let entity = world.create_entity();
        world.kill_entity(entity);
        world.update();

        // Stale handle: must not mark the recycled slot.
        let recycled = world.create_entity();
        world.kill_entity(entity);
        world.update();
        assert!(world.is_valid(recycled));
    }

    #[test]
    fn test_swap_removal_preserves_swapped_index() {
        let mut world = World::new();
        let first = world.create_entity();
        let _middle = world.create_entity();
        let last = world.create_entity();

        world.kill_entity(first);
        world.update();

        // `last` was swapped into the freed position; id lookup must agree.
        assert_eq!(world.entity(last.id()), last);
        assert_eq!(world.alive_handles()[0], last);
    }

    #[test]
    fn test_ascending_kill_order_with_multiple_kills() {
        let mut world = World::new();
        let handles: Vec<EntityHandle> = (0..6).map(|_| world.create_entity()).collect();
        world.kill_entity(handles[0]);
        world.kill_entity(handles[4]);
        world.kill_entity(handles[2]);
        world.update();

        assert_eq!(world.entity_count(), 3);
        for (index, handle) in handles.iter().enumerate() {
            assert_eq!(world.is_valid(*handle), !matches!(index, 0 | 2 | 4));
        }
        // Every survivor still resolves through its id.
        for handle in [handles[1], handles[3], handles[5]] {
            assert_eq!(world.entity(handle.id()), handle);
        }
    }

    #[test]
    fn test_membership_converges_after_update() {
        let mut world = World::new();
        let (system, _, _) = TrackingSystem::new(FilterSpec::requiring(MOVABLE));
        world.add_system(system);

        let moving = world.create_entity();
        let idle = world.create_entity();
        world.add_components(moving, MOVABLE);
        world.update();

        let registry = world.systems();
        let system = registry.iter().next().unwrap();
        assert!(system.has_entity(moving.id()));
        assert!(!system.has_entity(idle.id()));

        // Losing the component leaves the system after the next pass.
        world.remove_components(moving, MOVABLE);
        world.update();
        assert!(!world.systems().iter().next().unwrap().has_entity(moving.id()));
    }

    #[test]
    fn test_update_is_idempotent_without_mutation() {
        let mut world = World::new();
        let (system, added, removed) = TrackingSystem::new(FilterSpec::requiring(MOVABLE));
        world.add_system(system);

        let entity = world.create_entity();
        world.add_components(entity, MOVABLE);
        world.update();
        let (baseline_added, baseline_removed) = (added.get(), removed.get());

        world.update();
        assert_eq!(added.get(), baseline_added);
        assert_eq!(removed.get(), baseline_removed);
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn test_kill_supersedes_dirty() {
        let mut world = World::new();
        let (system, added, _) = TrackingSystem::new(FilterSpec::requiring(MOVABLE));
        world.add_system(system);

        let entity = world.create_entity();
        world.add_components(entity, MOVABLE);
        world.kill_entity(entity);
        world.update();

        // Never added: the kill ran first and the dirty bit was skipped.
        assert_eq!(added.get(), 0);
        assert_eq!(world.entity_count(), 0);

        // The dirty bit was still consumed.
        let (system2_added, _) = {
            let (system, added, removed) = TrackingSystem::new(FilterSpec::requiring(MOVABLE));
            world.add_system(system);
            (added, removed)
        };
        world.update();
        assert_eq!(system2_added.get(), 0);
    }

    #[test]
    fn test_disabled_entity_leaves_systems() {
        let mut world = World::new();
        let (system, _, _) = TrackingSystem::new(FilterSpec::requiring(MOVABLE));
        world.add_system(system);

        let entity = world.create_entity();
        world.add_components(entity, MOVABLE);
        world.update();
        assert!(world.systems().iter().next().unwrap().has_entity(entity.id()));

        world.set_enabled(entity, false);
        world.update();
        assert!(!world.systems().iter().next().unwrap().has_entity(entity.id()));
    }

    #[test]
    fn test_clear_empties_systems_and_store() {
        let mut world = World::new();
        let (system, _, removed) = TrackingSystem::new(FilterSpec::requiring(MOVABLE));
        world.add_system(system);

        let a = world.create_entity();
        let b = world.create_entity();
        world.add_components(a, MOVABLE);
        world.add_components(b, MOVABLE);
        world.update();

        world.clear();
        assert_eq!(world.entity_count(), 0);
        assert!(!world.is_valid(a));
        assert!(!world.is_valid(b));
        assert_eq!(removed.get(), 2);

        // A fresh update performs no further work.
        world.update();
        assert_eq!(removed.get(), 2);
    }

    #[test]
    fn test_invalid_id_lookup_yields_invalid_handle() {
        let mut world = World::new();
        let entity = world.create_entity();
        world.kill_entity(entity);
        world.update();
        assert_eq!(world.entity(entity.id()), EntityHandle::INVALID);
        assert_eq!(world.entity(EntityId::new(999)), EntityHandle::INVALID);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = WorldConfig {
            initial_capacity: 64,
        };
        let world = World::with_config(&config);
        assert_eq!(world.entity_count(), 0);
    }
}
