//! # Scene Engine
//!
//! Entity management and scene rendering core for a real-time graphics engine.
//!
//! ## Features
//!
//! - **Entity World**: dense entity slots, generational weak handles, and a
//!   two-phase update pass reconciling subsystem membership
//! - **Dirty/Kill Tracking**: bitset-indexed deferred destruction and
//!   re-evaluation with ascending-id iteration
//! - **Glyph Batching**: styled glyph runs converted into per-atlas,
//!   GPU-ready vertex batches
//! - **Atlas Invalidation**: live batch repair or invalidation when atlas
//!   pages are resized, cleared, or released
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_engine::prelude::*;
//!
//! let mut world = World::new();
//!
//! let entity = world.create_entity();
//! world.add_components(entity, ComponentMask::from_bit(0));
//! world.update();
//! assert!(world.is_valid(entity));
//!
//! world.kill_entity(entity);
//! assert!(world.is_valid(entity)); // destruction is deferred
//! world.update();
//! assert!(!world.is_valid(entity));
//! ```

pub mod foundation;
pub mod ecs;
pub mod render;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        ecs::{
            ComponentMask, DirtyTracker, Entity, EntityHandle, EntityId, EntityList,
            EntityStore, FilterSpec, System, SystemRegistry, World, WorldConfig,
        },
        foundation::{
            collections::{BitSet, IndexPool},
            math::{Mat4, Rect, RectCorner, Vec2, Vec3},
        },
        render::{
            AtlasId, AtlasListener, AtlasSource, BatchError, Color, GlyphBatcher,
            ListenerSet, LocalVertex, Material, MaterialHandle, MaterialRegistry,
            RenderIndices, RenderQueue, RenderStates, SharedAtlas, SimpleTextDrawer,
            SpriteVertex, StyledGlyph, TextDrawer, TextureId, TexturePage,
        },
    };
}
