use oregen_types::BlockPos;
use serde::Serialize;
use thiserror::Error;

/// Reasons the block registry refuses a placement.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
pub enum PlacementError {
    #[error("position {0} already holds a custom block")]
    Occupied(BlockPos),

    #[error("custom block type {0:?} is not registered")]
    UnknownBlock(String),

    #[error("placement rejected: {0}")]
    Rejected(String),
}

/// The placement that stopped a scan's commit phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFailure {
    pub pos: BlockPos,
    pub error: PlacementError,
}

impl std::fmt::Display for ScanFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "placement at {} failed: {}", self.pos, self.error)
    }
}
