//! Host seams consumed by the scanner.

use oregen_types::{BlockPos, Material, WorldId};

use crate::error::PlacementError;
use crate::scanner::CustomBlock;

/// Read access to one loaded chunk.
///
/// The horizontal footprint is always `CHUNK_WIDTH × CHUNK_WIDTH`; local
/// offsets passed to [`material_at`](ChunkView::material_at) are in
/// `0..CHUNK_WIDTH`. The vertical extent is `min_height()..max_height()`.
pub trait ChunkView {
    fn world(&self) -> WorldId;

    fn chunk_x(&self) -> i32;

    fn chunk_z(&self) -> i32;

    /// Lowest buildable y, inclusive.
    fn min_height(&self) -> i32;

    /// Highest buildable y, exclusive.
    fn max_height(&self) -> i32;

    /// Material of the block at the local offset and absolute `y`.
    fn material_at(&self, local_x: i32, y: i32, local_z: i32) -> Material;
}

/// The plugin's custom block registry.
///
/// Used only by [`ChunkScanner`](crate::ChunkScanner) to place generated
/// blocks. Implementations must be thread-safe; placement for a given world
/// position either fully succeeds or leaves the world untouched.
pub trait BlockRegistry: Send + Sync {
    fn place_custom_block(
        &self,
        world: WorldId,
        pos: BlockPos,
        block: &CustomBlock,
    ) -> Result<(), PlacementError>;
}

impl<T: BlockRegistry + ?Sized> BlockRegistry for std::sync::Arc<T> {
    fn place_custom_block(
        &self,
        world: WorldId,
        pos: BlockPos,
        block: &CustomBlock,
    ) -> Result<(), PlacementError> {
        (**self).place_custom_block(world, pos, block)
    }
}
