//! Text layout sources
//!
//! A [`TextDrawer`] describes laid-out, styled text: the fonts (and through
//! them, the atlases) it touches and one [`StyledGlyph`] per visible glyph.
//! Layout itself (shaping, line breaking, cursor advance) belongs to the
//! font layer; this module only defines the contract the glyph batcher
//! consumes, plus a plain-data implementation.

use super::atlas::{SharedAtlas, TexturePage};
use super::Color;
use crate::foundation::math::{Rect, Vec2};

/// One laid-out glyph, ready for batching
#[derive(Debug, Clone)]
pub struct StyledGlyph {
    /// Quad corners in text-local space:
    /// left-top, right-top, left-bottom, right-bottom
    pub corners: [Vec2; 4],
    /// Glyph color, before tinting
    pub color: Color,
    /// Glyph rectangle inside the atlas page, in pixels
    pub atlas_rect: Rect<f32>,
    /// Atlas page holding the glyph
    pub page: TexturePage,
    /// Whether the glyph was stored rotated 90° counterclockwise
    pub flipped: bool,
}

/// Source of laid-out text consumed by the glyph batcher
pub trait TextDrawer {
    /// Number of fonts referenced by the text
    fn font_count(&self) -> usize;

    /// Atlas of the font at `index`
    fn font_atlas(&self, index: usize) -> SharedAtlas;

    /// Number of glyphs in the text
    fn glyph_count(&self) -> usize;

    /// Glyph at `index`
    fn glyph(&self, index: usize) -> &StyledGlyph;

    /// Bounding rectangle of the laid-out text, in text-local space
    fn bounds(&self) -> Rect<f32>;
}

/// Plain-data text drawer
///
/// Collects fonts and glyphs pushed by a layout stage and accumulates the
/// text bounds from glyph corners.
#[derive(Default)]
pub struct SimpleTextDrawer {
    atlases: Vec<SharedAtlas>,
    glyphs: Vec<StyledGlyph>,
    bounds: Option<Rect<f32>>,
}

impl SimpleTextDrawer {
    /// Create an empty drawer
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a font by its atlas
    ///
    /// Fonts may share an atlas; deduplication is the batcher's concern.
    pub fn add_font(&mut self, atlas: SharedAtlas) {
        self.atlases.push(atlas);
    }

    /// Append a glyph, extending the text bounds by its corners
    pub fn push_glyph(&mut self, glyph: StyledGlyph) {
        match &mut self.bounds {
            Some(bounds) => {
                for corner in &glyph.corners {
                    bounds.extend(*corner);
                }
            }
            None => self.bounds = Some(Rect::bounding(&glyph.corners)),
        }
        self.glyphs.push(glyph);
    }

    /// Drop all fonts, glyphs, and bounds
    pub fn clear(&mut self) {
        self.atlases.clear();
        self.glyphs.clear();
        self.bounds = None;
    }
}

impl TextDrawer for SimpleTextDrawer {
    fn font_count(&self) -> usize {
        self.atlases.len()
    }

    fn font_atlas(&self, index: usize) -> SharedAtlas {
        SharedAtlas::clone(&self.atlases[index])
    }

    fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    fn glyph(&self, index: usize) -> &StyledGlyph {
        &self.glyphs[index]
    }

    fn bounds(&self) -> Rect<f32> {
        self.bounds.unwrap_or(Rect::ZERO)
    }
}
