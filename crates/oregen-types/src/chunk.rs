use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{OreTypeId, WorldId};

/// Horizontal width of a chunk, in blocks, along both x and z.
pub const CHUNK_WIDTH: i32 = 16;

/// Primary key of the generation ledger.
///
/// Identifies the generation state of one chunk for one ore type. Ordering
/// is ore type, then world, then chunk x, then chunk z.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkKey {
    pub ore_type: OreTypeId,
    pub world: WorldId,
    pub chunk_x: i32,
    pub chunk_z: i32,
}

impl ChunkKey {
    pub fn new(ore_type: OreTypeId, world: WorldId, chunk_x: i32, chunk_z: i32) -> Self {
        Self {
            ore_type,
            world,
            chunk_x,
            chunk_z,
        }
    }
}

impl fmt::Debug for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ChunkKey({} {} [{}, {}])",
            self.ore_type,
            self.world.short_id(),
            self.chunk_x,
            self.chunk_z
        )
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}:{},{}",
            self.ore_type, self.world, self.chunk_x, self.chunk_z
        )
    }
}

/// Which persisted table a [`LedgerEntry`] was read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// The unified per-ore ledger table.
    Ledger,
    /// The pre-unification table kept for the grandfathered ore type.
    Legacy,
}

/// A chunk recorded as generated. Never mutated once written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub key: ChunkKey,
    pub generated_at: DateTime<Utc>,
    pub source: EntrySource,
}

impl LedgerEntry {
    pub fn new(key: ChunkKey, generated_at: DateTime<Utc>, source: EntrySource) -> Self {
        Self {
            key,
            generated_at,
            source,
        }
    }
}

/// World-space block position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Position of local offset (`local_x`, `local_z`) inside chunk
    /// (`chunk_x`, `chunk_z`). Local offsets are in `0..CHUNK_WIDTH`.
    ///
    /// The chunk must satisfy [`chunk_in_range`](Self::chunk_in_range);
    /// use [`checked_in_chunk`](Self::checked_in_chunk) for untrusted input.
    pub const fn in_chunk(chunk_x: i32, chunk_z: i32, local_x: i32, y: i32, local_z: i32) -> Self {
        Self {
            x: chunk_x * CHUNK_WIDTH + local_x,
            y,
            z: chunk_z * CHUNK_WIDTH + local_z,
        }
    }

    /// Like [`in_chunk`](Self::in_chunk), but `None` when the block
    /// coordinates do not fit in an `i32`.
    pub fn checked_in_chunk(
        chunk_x: i32,
        chunk_z: i32,
        local_x: i32,
        y: i32,
        local_z: i32,
    ) -> Option<Self> {
        let x = chunk_x.checked_mul(CHUNK_WIDTH)?.checked_add(local_x)?;
        let z = chunk_z.checked_mul(CHUNK_WIDTH)?.checked_add(local_z)?;
        Some(Self { x, y, z })
    }

    /// Returns `true` if every block of chunk (`chunk_x`, `chunk_z`) has
    /// `i32` world coordinates.
    pub fn chunk_in_range(chunk_x: i32, chunk_z: i32) -> bool {
        let edge = CHUNK_WIDTH - 1;
        Self::checked_in_chunk(chunk_x, chunk_z, edge, 0, edge).is_some()
    }

    /// Chunk coordinates containing this position.
    pub const fn chunk(&self) -> (i32, i32) {
        (self.x.div_euclid(CHUNK_WIDTH), self.z.div_euclid(CHUNK_WIDTH))
    }

    /// Offsets of this position within its chunk, each in `0..CHUNK_WIDTH`.
    pub const fn local(&self) -> (i32, i32) {
        (self.x.rem_euclid(CHUNK_WIDTH), self.z.rem_euclid(CHUNK_WIDTH))
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
