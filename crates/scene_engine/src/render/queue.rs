//! Render queue sink
//!
//! The glyph batcher hands finished batches to a [`RenderQueue`]: one call
//! per texture, covering a contiguous run of 4-vertices-per-sprite quads
//! tagged with a single material. Queue implementations own buffer
//! allocation; an allocation failure surfaces as a [`BatchError`] and
//! aborts only the submission that triggered it.

use super::atlas::TextureId;
use super::material::MaterialHandle;
use super::vertex::SpriteVertex;

/// Errors surfaced at the batch submission boundary
#[derive(Debug, Clone, thiserror::Error)]
pub enum BatchError {
    /// The queue could not allocate or grow its vertex buffer
    #[error("failed to allocate vertex buffer: {0}")]
    BufferAllocation(String),

    /// The queue rejected the submission
    #[error("render queue submission failed: {0}")]
    Submission(String),
}

/// Sink accepting sprite batches for drawing
pub trait RenderQueue {
    /// Submit a contiguous run of quads
    ///
    /// `vertices` holds exactly `4 * sprite_count` entries, all sampling
    /// `texture` and drawn with `material`.
    fn add_sprites(
        &mut self,
        material: MaterialHandle,
        vertices: &[SpriteVertex],
        sprite_count: usize,
        texture: TextureId,
    ) -> Result<(), BatchError>;
}

/// One recorded sprite batch
#[derive(Debug, Clone)]
pub struct SpriteBatch {
    /// Material the batch is drawn with
    pub material: MaterialHandle,
    /// Texture sampled by every sprite in the batch
    pub texture: TextureId,
    /// Vertex data, 4 per sprite
    pub vertices: Vec<SpriteVertex>,
    /// Number of sprites
    pub sprite_count: usize,
}

/// Queue implementation that records batches for later playback
///
/// Useful as a reference sink and in tests; a GPU-backed queue would
/// translate each batch into a buffer range and draw call instead.
#[derive(Debug, Default)]
pub struct RecordingQueue {
    batches: Vec<SpriteBatch>,
}

impl RecordingQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded batches, in submission order
    pub fn batches(&self) -> &[SpriteBatch] {
        &self.batches
    }

    /// Drop all recorded batches
    pub fn clear(&mut self) {
        self.batches.clear();
    }
}

impl RenderQueue for RecordingQueue {
    fn add_sprites(
        &mut self,
        material: MaterialHandle,
        vertices: &[SpriteVertex],
        sprite_count: usize,
        texture: TextureId,
    ) -> Result<(), BatchError> {
        debug_assert_eq!(vertices.len(), sprite_count * 4, "4 vertices per sprite");
        self.batches.push(SpriteBatch {
            material,
            texture,
            vertices: vertices.to_vec(),
            sprite_count,
        });
        Ok(())
    }
}
