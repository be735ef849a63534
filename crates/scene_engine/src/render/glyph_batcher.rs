//! Batched glyph rendering
//!
//! [`GlyphBatcher`] converts a stream of styled glyphs into GPU-ready
//! vertex batches grouped by atlas texture. Batches stay valid across atlas
//! mutations: a resized page triggers an in-place UV rescale of just the
//! affected range, while a cleared or released atlas invalidates the whole
//! batch (geometry validity cannot be locally repaired).
//!
//! The batcher registers itself as a listener on every atlas its current
//! text references; the listener-registration set and the atlas set are
//! kept equal at all times.

use std::cell::RefCell;
use std::mem;
use std::rc::{Rc, Weak};

use bytemuck::Zeroable;

use super::atlas::{AtlasId, AtlasListener, TexturePage, TextureId, WeakAtlas, WeakListener};
use super::material::MaterialHandle;
use super::queue::{BatchError, RenderQueue};
use super::text_layout::TextDrawer;
use super::vertex::{LocalVertex, SpriteVertex};
use super::Color;
use crate::foundation::math::{Mat4, Point3, Rect, RectCorner, Vec2};

/// Contiguous vertex range drawn with one atlas texture
///
/// Ranges for distinct textures are disjoint and together cover the whole
/// vertex buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderIndices {
    /// Index of the range's first glyph (vertex index is `first_glyph * 4`)
    pub first_glyph: u32,
    /// Number of glyphs in the range
    pub count: u32,
}

/// Builder of per-atlas sprite batches for one piece of text
///
/// Owned through `Rc<RefCell<..>>` so the batcher can register itself as an
/// [`AtlasListener`]; dropping the last `Rc` unregisters it from every
/// atlas it still listens to.
pub struct GlyphBatcher {
    self_weak: Weak<RefCell<GlyphBatcher>>,
    material: MaterialHandle,
    color: Color,
    transform: Mat4,
    /// Distinct atlases referenced by the current text.
    atlases: Vec<(AtlasId, WeakAtlas)>,
    /// Per-texture ranges, in first-seen texture order.
    render_infos: Vec<(TextureId, RenderIndices)>,
    local_vertices: Vec<LocalVertex>,
    vertices: Vec<SpriteVertex>,
    local_bounds: Rect<f32>,
    bounds: Rect<f32>,
    vertices_updated: bool,
    bounds_updated: bool,
}

impl GlyphBatcher {
    /// Create a batcher drawing with `material`
    ///
    /// The material is injected rather than constructed internally; see
    /// [`Material::text_default`](super::Material::text_default) for the
    /// usual choice.
    pub fn new(material: MaterialHandle) -> Rc<RefCell<Self>> {
        Rc::new_cyclic(|self_weak| {
            RefCell::new(Self {
                self_weak: Weak::clone(self_weak),
                material,
                color: Color::WHITE,
                transform: Mat4::identity(),
                atlases: Vec::new(),
                render_infos: Vec::new(),
                local_vertices: Vec::new(),
                vertices: Vec::new(),
                local_bounds: Rect::ZERO,
                bounds: Rect::ZERO,
                vertices_updated: false,
                bounds_updated: false,
            })
        })
    }

    /// Material used for every batch
    pub fn material(&self) -> MaterialHandle {
        self.material
    }

    /// Replace the material used for every batch
    pub fn set_material(&mut self, material: MaterialHandle) {
        self.material = material;
    }

    /// Tint combined with per-glyph colors
    pub fn color(&self) -> Color {
        self.color
    }

    /// Set the tint, invalidating the final vertices
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        self.vertices_updated = false;
    }

    /// World transform applied to glyph-local positions
    pub fn transform(&self) -> &Mat4 {
        &self.transform
    }

    /// Set the world transform, invalidating final vertices and bounds
    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
        self.vertices_updated = false;
        self.bounds_updated = false;
    }

    /// Rebuild all batches from a laid-out text
    ///
    /// Unregisters from every previously listened atlas, registers on every
    /// atlas the new text references, then builds per-texture vertex ranges
    /// in first-seen texture order.
    pub fn set_text(&mut self, drawer: &dyn TextDrawer) {
        self.unregister_atlases(None);
        self.render_infos.clear();

        // Listen on every distinct atlas referenced by the text's fonts.
        for index in 0..drawer.font_count() {
            let atlas = drawer.font_atlas(index);
            let id = atlas.borrow().id();
            if !self.is_listening_to(id) {
                atlas.borrow_mut().add_listener(self.listener_entry());
                self.atlases.push((id, Rc::downgrade(&atlas)));
            }
        }

        let glyph_count = drawer.glyph_count();
        self.local_vertices.clear();
        self.local_vertices
            .resize(glyph_count * 4, LocalVertex::default());
        self.vertices.clear();
        self.vertices
            .resize(glyph_count * 4, SpriteVertex::zeroed());

        // First pass: count glyphs per texture, preserving first-seen order.
        let mut last: Option<(TextureId, usize)> = None;
        for index in 0..glyph_count {
            let texture = drawer.glyph(index).page.texture;
            let slot = self.texture_slot(texture, &mut last);
            self.render_infos[slot].1.count += 1;
        }

        // Assign each texture its contiguous range, then reset the counts:
        // the fill pass below reuses them as write cursors.
        let mut first_glyph = 0;
        for (_, indices) in &mut self.render_infos {
            indices.first_glyph = first_glyph;
            first_glyph += indices.count;
            indices.count = 0;
        }

        // Second pass: write local corners and normalized UVs at each
        // glyph's position inside its texture range.
        let mut last: Option<(TextureId, usize)> = None;
        for index in 0..glyph_count {
            let glyph = drawer.glyph(index);
            let slot = self.texture_slot(glyph.page.texture, &mut last);
            let indices = &mut self.render_infos[slot].1;
            let glyph_slot = (indices.first_glyph + indices.count) as usize;
            indices.count += 1;

            for (corner, local) in glyph
                .corners
                .iter()
                .zip(&mut self.local_vertices[glyph_slot * 4..glyph_slot * 4 + 4])
            {
                *local = LocalVertex {
                    position: *corner,
                    color: glyph.color,
                };
            }

            let (width, height) = glyph.page.size();
            debug_assert!(width > 0 && height > 0, "atlas page must have extent");
            let inv_width = 1.0 / width as f32;
            let inv_height = 1.0 / height as f32;
            let uv_rect = Rect::new(
                glyph.atlas_rect.x * inv_width,
                glyph.atlas_rect.y * inv_height,
                glyph.atlas_rect.width * inv_width,
                glyph.atlas_rect.height * inv_height,
            );

            // Flipped glyphs were stored rotated in the atlas; their UV
            // corners map to vertex corners in clockwise-rotated order.
            let corner_order = if glyph.flipped {
                [
                    RectCorner::LeftBottom,
                    RectCorner::LeftTop,
                    RectCorner::RightBottom,
                    RectCorner::RightTop,
                ]
            } else {
                [
                    RectCorner::LeftTop,
                    RectCorner::RightTop,
                    RectCorner::LeftBottom,
                    RectCorner::RightBottom,
                ]
            };
            for (offset, corner) in corner_order.into_iter().enumerate() {
                let uv = uv_rect.corner(corner);
                self.vertices[glyph_slot * 4 + offset].uv = [uv.x, uv.y];
            }
        }

        self.local_bounds = drawer.bounds();
        self.vertices_updated = false;
        self.bounds_updated = false;
    }

    /// Submit one batch per texture with a nonzero glyph count
    ///
    /// Stale final vertices are recomputed first. A queue failure is
    /// reported once and aborts only the remaining submissions; already
    /// built state is left intact.
    pub fn add_to_render_queue(&mut self, queue: &mut dyn RenderQueue) -> Result<(), BatchError> {
        if !self.vertices_updated {
            self.update_vertices();
        }

        for (texture, indices) in &self.render_infos {
            if indices.count == 0 {
                continue;
            }
            let first = (indices.first_glyph * 4) as usize;
            let last = first + (indices.count * 4) as usize;
            if let Err(error) = queue.add_sprites(
                self.material,
                &self.vertices[first..last],
                indices.count as usize,
                *texture,
            ) {
                log::error!(
                    "dropping glyph batch of {} sprites: {error}",
                    indices.count
                );
                return Err(error);
            }
        }
        Ok(())
    }

    /// Drop all batches and unregister from every atlas
    pub fn clear(&mut self) {
        self.clear_dependent(None);
    }

    /// Bounding rectangle of the transformed text
    ///
    /// Recomputed lazily from the local bounds and the world transform.
    pub fn bounds(&mut self) -> Rect<f32> {
        if !self.bounds_updated {
            let corners = [
                RectCorner::LeftTop,
                RectCorner::RightTop,
                RectCorner::LeftBottom,
                RectCorner::RightBottom,
            ]
            .map(|corner| {
                let local = self.local_bounds.corner(corner);
                let world = self
                    .transform
                    .transform_point(&Point3::new(local.x, local.y, 0.0));
                Vec2::new(world.x, world.y)
            });
            self.bounds = Rect::bounding(&corners);
            self.bounds_updated = true;
        }
        self.bounds
    }

    /// Per-texture ranges of the current text, in first-seen order
    pub fn texture_ranges(&self) -> &[(TextureId, RenderIndices)] {
        &self.render_infos
    }

    /// Number of atlases currently listened to
    pub fn atlas_count(&self) -> usize {
        self.atlases.len()
    }

    /// Whether this batcher is registered on `atlas`
    pub fn is_listening_to(&self, atlas: AtlasId) -> bool {
        self.atlases.iter().any(|(id, _)| *id == atlas)
    }

    /// This batcher's listener registration entry
    fn listener_entry(&self) -> WeakListener {
        self.self_weak.clone()
    }

    /// Range slot for `texture`, creating it on first sight
    ///
    /// `last` caches the previous lookup; glyph runs switch texture rarely.
    fn texture_slot(&mut self, texture: TextureId, last: &mut Option<(TextureId, usize)>) -> usize {
        if let Some((cached, slot)) = *last {
            if cached == texture {
                return slot;
            }
        }
        let slot = match self.render_infos.iter().position(|(id, _)| *id == texture) {
            Some(slot) => slot,
            None => {
                self.render_infos.push((texture, RenderIndices::default()));
                self.render_infos.len() - 1
            }
        };
        *last = Some((texture, slot));
        slot
    }

    /// Recompute final vertices from locals, transform, and tint
    ///
    /// UVs are written by `set_text` (and patched by layer changes) and are
    /// not touched here.
    fn update_vertices(&mut self) {
        for (local, vertex) in self.local_vertices.iter().zip(&mut self.vertices) {
            let world = self
                .transform
                .transform_point(&Point3::new(local.position.x, local.position.y, 0.0));
            vertex.position = [world.x, world.y, world.z];
            vertex.color = (self.color * local.color).to_array();
        }
        self.vertices_updated = true;
    }

    /// Unregister from every atlas except `skip`, dropping the atlas set
    ///
    /// `skip` is the atlas currently notifying us, whose listener list must
    /// not be mutated mid-iteration; its registration ends through the
    /// callback protocol instead.
    fn unregister_atlases(&mut self, skip: Option<AtlasId>) {
        let listener = self.listener_entry();
        for (id, atlas) in mem::take(&mut self.atlases) {
            if Some(id) == skip {
                continue;
            }
            if let Some(atlas) = atlas.upgrade() {
                atlas.borrow_mut().remove_listener(&listener);
            }
        }
    }

    /// Clear all dependent state: ranges, vertices, bounds, registrations
    fn clear_dependent(&mut self, skip: Option<AtlasId>) {
        self.unregister_atlases(skip);
        self.render_infos.clear();
        self.local_vertices.clear();
        self.vertices.clear();
        self.local_bounds = Rect::ZERO;
        self.bounds = Rect::ZERO;
        self.vertices_updated = false;
        self.bounds_updated = false;
    }
}

impl AtlasListener for GlyphBatcher {
    fn on_atlas_cleared(&mut self, atlas: AtlasId) -> bool {
        debug_assert!(self.is_listening_to(atlas), "not listening to atlas");
        log::warn!("glyph batches cleared: atlas {atlas:?} in use has been cleared");
        self.clear_dependent(Some(atlas));
        false
    }

    fn on_atlas_layer_changed(&mut self, atlas: AtlasId, old: TexturePage, new: TexturePage) -> bool {
        debug_assert!(self.is_listening_to(atlas), "not listening to atlas");

        if let Some(slot) = self
            .render_infos
            .iter()
            .position(|(id, _)| *id == old.texture)
        {
            // Positions are still valid; only the UV normalization moved.
            let indices = self.render_infos[slot].1;
            let (old_width, old_height) = old.size();
            let (new_width, new_height) = new.size();
            let scale_x = old_width as f32 / new_width as f32;
            let scale_y = old_height as f32 / new_height as f32;

            let first = (indices.first_glyph * 4) as usize;
            let last = first + (indices.count * 4) as usize;
            for vertex in &mut self.vertices[first..last] {
                vertex.uv[0] *= scale_x;
                vertex.uv[1] *= scale_y;
            }

            // Same range, new backing texture.
            self.render_infos[slot].0 = new.texture;
        }

        true
    }

    fn on_atlas_released(&mut self, atlas: AtlasId) {
        debug_assert!(self.is_listening_to(atlas), "not listening to atlas");
        log::warn!("glyph batches cleared: atlas {atlas:?} in use has been released");
        self.clear_dependent(Some(atlas));
    }
}

impl Drop for GlyphBatcher {
    /// Guaranteed release: a batcher never outlives its registrations
    fn drop(&mut self) {
        self.unregister_atlases(None);
    }
}
