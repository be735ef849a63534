//! Scene rendering core
//!
//! Batched glyph rendering: styled glyph runs become per-atlas sprite
//! batches over a shared vertex buffer, kept valid across atlas mutations
//! through the listener protocol in [`atlas`].

pub mod atlas;
pub mod color;
pub mod glyph_batcher;
pub mod material;
pub mod queue;
pub mod text_layout;
pub mod vertex;

pub use atlas::{
    AtlasId, AtlasListener, AtlasSource, ListenerSet, SharedAtlas, SharedListener, TexturePage,
    TextureId, WeakAtlas, WeakListener,
};
pub use color::Color;
pub use glyph_batcher::{GlyphBatcher, RenderIndices};
pub use material::{BlendFunc, Material, MaterialHandle, MaterialRegistry, RenderStates};
pub use queue::{BatchError, RecordingQueue, RenderQueue, SpriteBatch};
pub use text_layout::{SimpleTextDrawer, StyledGlyph, TextDrawer};
pub use vertex::{LocalVertex, SpriteVertex};
