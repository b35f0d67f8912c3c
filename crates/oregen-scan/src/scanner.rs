use std::collections::HashMap;

use oregen_types::{BlockPos, GenerationRules, Material, OreTypeId, CHUNK_WIDTH};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ScanFailure;
use crate::traits::{BlockRegistry, ChunkView};

/// The representative block placed for an ore type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CustomBlock {
    pub ore_type: OreTypeId,
    /// Vanilla material the custom block is rendered as.
    pub appearance: Material,
}

impl CustomBlock {
    pub fn new(ore_type: OreTypeId, appearance: impl Into<Material>) -> Self {
        Self {
            ore_type,
            appearance: appearance.into(),
        }
    }
}

/// Positions in a chunk that already carry custom block data.
///
/// Positions present here are never selected for placement.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlacementContext {
    occupied: HashMap<BlockPos, OreTypeId>,
}

impl PlacementContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pos: BlockPos, ore_type: OreTypeId) {
        self.occupied.insert(pos, ore_type);
    }

    pub fn contains(&self, pos: &BlockPos) -> bool {
        self.occupied.contains_key(pos)
    }

    pub fn len(&self) -> usize {
        self.occupied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied.is_empty()
    }
}

impl FromIterator<(BlockPos, OreTypeId)> for PlacementContext {
    fn from_iter<I: IntoIterator<Item = (BlockPos, OreTypeId)>>(iter: I) -> Self {
        Self {
            occupied: iter.into_iter().collect(),
        }
    }
}

/// Side-effect-free outcome of a chunk traversal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanPlan {
    /// Blocks whose material is in the rules' target set.
    pub target_matches: u32,
    /// Positions selected for placement, in traversal order.
    pub placements: Vec<BlockPos>,
}

/// Aggregate outcome of a scan.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    /// Blocks already matching a target material.
    pub target_matches: u32,
    /// Blocks newly placed by this scan.
    pub registered_blocks: u32,
    /// Set when the registry rejected a placement and the commit stopped.
    pub failure: Option<ScanFailure>,
}

impl ScanResult {
    /// A result for a scan that placed nothing.
    pub fn counted(target_matches: u32) -> Self {
        Self {
            target_matches,
            ..Self::default()
        }
    }

    /// Returns `true` if every planned placement was committed.
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Walk `chunk` under `rules` and decide where blocks would be placed.
///
/// Traversal order is local x, then local z, then y ascending over
/// `[rules.min_y, rules.max_y]` clipped to the chunk's vertical extent, so a
/// seeded `rng` reproduces the same plan.
///
/// A block counts as a target match when its material is in the rules'
/// target set; matches are never replaced. Any other position is eligible
/// for placement unless it is air, excluded by the rules, or present in
/// `context`. While fewer than `max_quota` placements are planned, each
/// eligible position draws against `spawn_probability`; a successful draw
/// opens a cluster whose next `cluster_size - 1` eligible positions draw
/// against `secondary_probability` instead.
///
/// A chunk whose blocks have no `i32` world coordinates yields an empty plan.
pub fn plan_scan<C, G>(
    chunk: &C,
    rules: &GenerationRules,
    context: Option<&PlacementContext>,
    rng: &mut G,
) -> ScanPlan
where
    C: ChunkView + ?Sized,
    G: Rng,
{
    let low = rules.min_y().max(chunk.min_height());
    let high = rules.max_y().min(chunk.max_height() - 1);
    let quota = rules.max_quota() as usize;
    let (chunk_x, chunk_z) = (chunk.chunk_x(), chunk.chunk_z());
    if !BlockPos::chunk_in_range(chunk_x, chunk_z) {
        warn!(chunk_x, chunk_z, "chunk outside addressable coordinates; scan skipped");
        return ScanPlan::default();
    }

    let mut target_matches = 0u32;
    let mut placements = Vec::new();
    let mut cluster_remaining = 0u32;

    for local_x in 0..CHUNK_WIDTH {
        for local_z in 0..CHUNK_WIDTH {
            for y in low..=high {
                let material = chunk.material_at(local_x, y, local_z);
                if rules.is_target(&material) {
                    target_matches += 1;
                    continue;
                }
                if placements.len() >= quota
                    || material.is_air()
                    || rules.is_excluded(&material)
                {
                    continue;
                }
                let pos = BlockPos::in_chunk(chunk_x, chunk_z, local_x, y, local_z);
                if context.is_some_and(|ctx| ctx.contains(&pos)) {
                    continue;
                }

                if cluster_remaining > 0 {
                    cluster_remaining -= 1;
                    if rng.gen_bool(rules.secondary_probability()) {
                        placements.push(pos);
                    }
                } else if rng.gen_bool(rules.spawn_probability()) {
                    placements.push(pos);
                    cluster_remaining = rules.cluster_size() - 1;
                }
            }
        }
    }

    debug!(
        chunk_x,
        chunk_z,
        target_matches,
        planned = placements.len(),
        "chunk scan planned"
    );
    ScanPlan {
        target_matches,
        placements,
    }
}

/// Places planned blocks through a [`BlockRegistry`].
pub struct ChunkScanner<'r, R: ?Sized> {
    registry: &'r R,
}

impl<'r, R: BlockRegistry + ?Sized> ChunkScanner<'r, R> {
    pub fn new(registry: &'r R) -> Self {
        Self { registry }
    }

    /// Plan and commit in one call.
    pub fn scan_chunk_for_repair<C, G>(
        &self,
        chunk: &C,
        block: &CustomBlock,
        rules: &GenerationRules,
        context: Option<&PlacementContext>,
        rng: &mut G,
    ) -> ScanResult
    where
        C: ChunkView + ?Sized,
        G: Rng,
    {
        let plan = plan_scan(chunk, rules, context, rng);
        self.commit(chunk, block, plan)
    }

    /// Place every planned position in order.
    ///
    /// The first rejection stops the commit; the returned result then counts
    /// only the placements that succeeded and carries the failure.
    pub fn commit<C>(&self, chunk: &C, block: &CustomBlock, plan: ScanPlan) -> ScanResult
    where
        C: ChunkView + ?Sized,
    {
        let world = chunk.world();
        let mut result = ScanResult::counted(plan.target_matches);

        for pos in plan.placements {
            match self.registry.place_custom_block(world, pos, block) {
                Ok(()) => result.registered_blocks += 1,
                Err(error) => {
                    warn!(
                        ore = %block.ore_type,
                        %pos,
                        %error,
                        placed = result.registered_blocks,
                        "custom block placement rejected; aborting chunk scan"
                    );
                    result.failure = Some(ScanFailure { pos, error });
                    break;
                }
            }
        }
        result
    }
}
