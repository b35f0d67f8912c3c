use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use oregen_types::{BlockPos, Material, WorldId};

use crate::error::PlacementError;
use crate::scanner::{CustomBlock, PlacementContext};
use crate::traits::{BlockRegistry, ChunkView};

/// A chunk held entirely in memory: one fill material plus overrides.
#[derive(Clone, Debug)]
pub struct InMemoryChunk {
    world: WorldId,
    chunk_x: i32,
    chunk_z: i32,
    min_height: i32,
    max_height: i32,
    fill: Material,
    blocks: HashMap<(i32, i32, i32), Material>,
}

impl InMemoryChunk {
    /// A chunk spanning `min_height..max_height` filled with `fill`.
    pub fn new(
        world: WorldId,
        chunk_x: i32,
        chunk_z: i32,
        min_height: i32,
        max_height: i32,
        fill: impl Into<Material>,
    ) -> Self {
        Self {
            world,
            chunk_x,
            chunk_z,
            min_height,
            max_height,
            fill: fill.into(),
            blocks: HashMap::new(),
        }
    }

    /// Override the block at a local offset.
    pub fn set(&mut self, local_x: i32, y: i32, local_z: i32, material: impl Into<Material>) {
        self.blocks.insert((local_x, y, local_z), material.into());
    }
}

impl ChunkView for InMemoryChunk {
    fn world(&self) -> WorldId {
        self.world
    }

    fn chunk_x(&self) -> i32 {
        self.chunk_x
    }

    fn chunk_z(&self) -> i32 {
        self.chunk_z
    }

    fn min_height(&self) -> i32 {
        self.min_height
    }

    fn max_height(&self) -> i32 {
        self.max_height
    }

    fn material_at(&self, local_x: i32, y: i32, local_z: i32) -> Material {
        if !(self.min_height..self.max_height).contains(&y) {
            return Material::air();
        }
        self.blocks
            .get(&(local_x, y, local_z))
            .cloned()
            .unwrap_or_else(|| self.fill.clone())
    }
}

/// Block registry that records placements in memory.
///
/// Positions registered with [`reject_at`](Self::reject_at) fail with
/// [`PlacementError::Rejected`], which lets tests exercise aborted scans.
#[derive(Default)]
pub struct InMemoryBlockRegistry {
    placed: Mutex<BTreeMap<(WorldId, BlockPos), CustomBlock>>,
    rejected: Mutex<HashSet<BlockPos>>,
}

impl InMemoryBlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future placement at `pos` fail.
    pub fn reject_at(&self, pos: BlockPos) {
        self.rejected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pos);
    }

    /// Stop rejecting placements.
    pub fn clear_rejections(&self) {
        self.rejected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn placed_count(&self) -> usize {
        self.placed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// The custom block at `pos` in `world`, if one was placed.
    pub fn block_at(&self, world: WorldId, pos: BlockPos) -> Option<CustomBlock> {
        self.placed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(world, pos))
            .cloned()
    }

    /// Custom blocks already placed inside chunk (`chunk_x`, `chunk_z`),
    /// in the shape the scanner accepts as a placement context.
    pub fn context_for(&self, world: WorldId, chunk_x: i32, chunk_z: i32) -> PlacementContext {
        self.placed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|((w, pos), _)| *w == world && pos.chunk() == (chunk_x, chunk_z))
            .map(|((_, pos), block)| (*pos, block.ore_type.clone()))
            .collect()
    }
}

impl BlockRegistry for InMemoryBlockRegistry {
    fn place_custom_block(
        &self,
        world: WorldId,
        pos: BlockPos,
        block: &CustomBlock,
    ) -> Result<(), PlacementError> {
        if self
            .rejected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&pos)
        {
            return Err(PlacementError::Rejected(format!("position {pos} is protected")));
        }
        let mut placed = self.placed.lock().unwrap_or_else(PoisonError::into_inner);
        if placed.contains_key(&(world, pos)) {
            return Err(PlacementError::Occupied(pos));
        }
        placed.insert((world, pos), block.clone());
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryBlockRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlockRegistry")
            .field("placed_count", &self.placed_count())
            .finish()
    }
}
