//! Vertex data for sprite batching
//!
//! Local vertices hold glyph-space position and color; final vertices are
//! world-space and GPU-ready. The two are kept separate so final vertices
//! can be lazily recomputed from the locals whenever the world transform or
//! tint changes.

use super::Color;
use crate::foundation::math::Vec2;

/// Glyph-local vertex: untransformed position and color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalVertex {
    /// Position in glyph-local space
    pub position: Vec2,
    /// Per-glyph color, before tinting
    pub color: Color,
}

impl Default for LocalVertex {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            color: Color::WHITE,
        }
    }
}

/// Final world-space vertex, laid out for GPU upload
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct SpriteVertex {
    /// Position in world space
    pub position: [f32; 3],
    /// Tinted color
    pub color: [f32; 4],
    /// Normalized texture coordinates
    pub uv: [f32; 2],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprite_vertex_layout() {
        // Verify SpriteVertex is compatible with bytemuck for GPU upload
        assert_eq!(
            std::mem::size_of::<SpriteVertex>(),
            std::mem::size_of::<f32>() * 9 // 3 position + 4 color + 2 uv
        );
    }

    #[test]
    fn test_sprite_vertex_cast() {
        let vertices = [SpriteVertex {
            position: [1.0, 2.0, 3.0],
            color: [1.0, 1.0, 1.0, 1.0],
            uv: [0.5, 0.5],
        }];
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), 36);
    }
}
