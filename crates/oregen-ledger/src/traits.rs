use oregen_types::{ChunkKey, LedgerEntry};

use crate::error::LedgerResult;

/// Result of attempting to mark a chunk as generated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    /// A new row was written; this caller owns the generation.
    Inserted,
    /// A row for the key already existed; nothing was written.
    AlreadyPresent,
    /// The legacy table already covers this key; the ledger was not touched.
    LegacyCovered,
}

impl MarkOutcome {
    /// Returns `true` only when this call created the entry.
    pub fn is_inserted(self) -> bool {
        matches!(self, Self::Inserted)
    }
}

/// Recorded generation state of a single key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkStatus {
    /// No record in either table.
    Unseen,
    /// A row exists in the unified ledger.
    Recorded,
    /// Only the legacy table has a row for this key.
    LegacyCovered,
}

/// Storage backend for the generation ledger.
///
/// All implementations must satisfy these invariants:
/// - At most one entry exists per [`ChunkKey`]; a duplicate mark reports
///   [`MarkOutcome::AlreadyPresent`] and writes nothing.
/// - Among concurrent marks of the same key exactly one observes
///   [`MarkOutcome::Inserted`].
/// - For the configured legacy ore type, a legacy row makes
///   `mark_chunk_generated` return [`MarkOutcome::LegacyCovered`] without
///   writing to the unified ledger.
/// - After `shutdown`, every operation returns
///   [`LedgerError::Unavailable`](crate::LedgerError::Unavailable).
pub trait ChunkLedger: Send + Sync {
    /// Record `key` as generated with the current timestamp, unless it is
    /// already recorded or covered by the legacy table.
    fn mark_chunk_generated(&self, key: &ChunkKey) -> LedgerResult<MarkOutcome>;

    /// Look up the recorded state of `key`.
    fn status(&self, key: &ChunkKey) -> LedgerResult<ChunkStatus>;

    /// All entries recorded for `ore_type`, ordered by world then chunk
    /// coordinates. For the legacy ore type this includes legacy rows.
    ///
    /// An empty or malformed `ore_type` yields `Ok(vec![])`.
    fn load_entries(&self, ore_type: &str) -> LedgerResult<Vec<LedgerEntry>>;

    /// Close the underlying store. Safe to call more than once.
    fn shutdown(&self);

    /// Returns `true` while the store can serve requests.
    fn is_open(&self) -> bool;

    /// Returns `true` if `key` is recorded in either table.
    fn is_generated(&self, key: &ChunkKey) -> LedgerResult<bool> {
        Ok(self.status(key)? != ChunkStatus::Unseen)
    }

    /// Keys recorded for `ore_type`, in the order of [`load_entries`].
    ///
    /// [`load_entries`]: ChunkLedger::load_entries
    fn load_generated_chunks(&self, ore_type: &str) -> LedgerResult<Vec<ChunkKey>> {
        Ok(self
            .load_entries(ore_type)?
            .into_iter()
            .map(|entry| entry.key)
            .collect())
    }
}
