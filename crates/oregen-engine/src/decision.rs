use oregen_types::GenerationRules;
use serde::Serialize;

/// Whether a chunk with no ledger record should receive new blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairDecision {
    /// Place blocks as planned.
    Generate,
    /// The chunk already holds enough target blocks (hand-placed, or from a
    /// time before the ledger tracked this ore); record it without placing.
    AlreadyPopulated,
}

impl RepairDecision {
    /// A chunk is already populated once its target matches reach
    /// [`GenerationRules::populated_threshold`].
    pub fn evaluate(target_matches: u32, rules: &GenerationRules) -> Self {
        if target_matches >= rules.populated_threshold() {
            Self::AlreadyPopulated
        } else {
            Self::Generate
        }
    }

    pub fn places_blocks(self) -> bool {
        matches!(self, Self::Generate)
    }
}
