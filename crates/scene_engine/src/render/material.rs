//! Material system for sprite rendering
//!
//! Materials describe fixed-function render state for a batch. They are
//! owned by a [`MaterialRegistry`] and referenced through stable handles;
//! components receive their material handle at construction time instead of
//! constructing defaults internally.

use bitflags::bitflags;

use crate::foundation::collections::{HandleMap, TypedHandle};

bitflags! {
    /// Fixed-function pipeline toggles
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RenderStates: u32 {
        /// Alpha blending
        const BLEND = 1 << 0;
        /// Depth buffer writes
        const DEPTH_WRITE = 1 << 1;
        /// Back-face culling
        const FACE_CULLING = 1 << 2;
        /// Scene lighting
        const LIGHTING = 1 << 3;
    }
}

/// Blend factor for source or destination color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFunc {
    /// Multiply by one
    One,
    /// Multiply by zero
    Zero,
    /// Multiply by source alpha
    SrcAlpha,
    /// Multiply by one minus source alpha
    InvSrcAlpha,
}

/// Render state description for a draw batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Material {
    /// Enabled pipeline states
    pub states: RenderStates,
    /// Source blend factor
    pub src_blend: BlendFunc,
    /// Destination blend factor
    pub dst_blend: BlendFunc,
}

impl Material {
    /// Opaque lit material
    pub fn new() -> Self {
        Self {
            states: RenderStates::DEPTH_WRITE | RenderStates::FACE_CULLING | RenderStates::LIGHTING,
            src_blend: BlendFunc::One,
            dst_blend: BlendFunc::Zero,
        }
    }

    /// Material suited to text rendering
    ///
    /// Alpha-blended, no depth writes, no culling, unlit.
    pub fn text_default() -> Self {
        Self {
            states: RenderStates::BLEND,
            src_blend: BlendFunc::SrcAlpha,
            dst_blend: BlendFunc::InvSrcAlpha,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable reference to a registered material
pub type MaterialHandle = TypedHandle<Material>;

/// Owner of all materials, addressed through handles
#[derive(Debug, Default)]
pub struct MaterialRegistry {
    materials: HandleMap<Material>,
}

impl MaterialRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a material and return its handle
    pub fn insert(&mut self, material: Material) -> MaterialHandle {
        MaterialHandle::new(self.materials.insert(material))
    }

    /// Material behind a handle, if still registered
    pub fn get(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle.key())
    }

    /// Unregister a material
    pub fn remove(&mut self, handle: MaterialHandle) -> Option<Material> {
        self.materials.remove(handle.key())
    }

    /// Number of registered materials
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Whether no materials are registered
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_default_states() {
        let material = Material::text_default();
        assert!(material.states.contains(RenderStates::BLEND));
        assert!(!material.states.contains(RenderStates::DEPTH_WRITE));
        assert!(!material.states.contains(RenderStates::FACE_CULLING));
        assert!(!material.states.contains(RenderStates::LIGHTING));
        assert_eq!(material.src_blend, BlendFunc::SrcAlpha);
        assert_eq!(material.dst_blend, BlendFunc::InvSrcAlpha);
    }

    #[test]
    fn test_registry_insert_get_remove() {
        let mut registry = MaterialRegistry::new();
        let handle = registry.insert(Material::text_default());
        assert_eq!(registry.get(handle), Some(&Material::text_default()));

        registry.remove(handle);
        assert!(registry.get(handle).is_none());
        assert!(registry.is_empty());
    }
}
