use oregen_scan::ScanResult;
use oregen_types::ChunkKey;
use serde::Serialize;

use crate::decision::RepairDecision;

/// Terminal state of one `ensure_generated` request.
///
/// Requests begin with the ledger lookup; a key the ledger has never seen
/// proceeds to a scan, every other lookup result ends the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationState {
    /// The legacy table covers this chunk; no scan, no ledger write.
    LegacyCovered,
    /// A scan ran but its placements were rejected part-way; the chunk was
    /// left unrecorded so a later load can retry.
    Scanned,
    /// The ledger holds an entry for the chunk (written now or earlier).
    Recorded,
    /// The ledger was unavailable or failed.
    Degraded,
    /// No rules are registered for the ore type.
    UnknownOre,
    /// The chunk's blocks have no `i32` world coordinates; nothing was
    /// scanned or recorded.
    OutOfRange,
    /// Another thread is already processing this key.
    InFlight,
}

/// Everything the manager learned while handling one request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GenerationOutcome {
    pub key: ChunkKey,
    pub state: GenerationState,
    /// Present when a scan was executed.
    pub decision: Option<RepairDecision>,
    pub scan: Option<ScanResult>,
    /// `true` only when this request wrote the ledger entry.
    pub newly_recorded: bool,
}

impl GenerationOutcome {
    pub(crate) fn terminal(key: ChunkKey, state: GenerationState) -> Self {
        Self {
            key,
            state,
            decision: None,
            scan: None,
            newly_recorded: false,
        }
    }

    /// Blocks placed while handling this request.
    pub fn placed_blocks(&self) -> u32 {
        self.scan.as_ref().map_or(0, |s| s.registered_blocks)
    }
}
