use thiserror::Error;

/// Errors produced when constructing identifier types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("ore type identifier must not be empty")]
    EmptyOreType,

    #[error("invalid ore type identifier {id:?}: unexpected character {ch:?}")]
    InvalidOreType { id: String, ch: char },

    #[error("invalid world id {0:?}")]
    InvalidWorldId(String),
}

/// Reasons a set of generation rules is rejected at construction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RulesError {
    #[error("min_y {min_y} is above max_y {max_y}")]
    InvertedHeightRange { min_y: i32, max_y: i32 },

    #[error("{field} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange { field: &'static str, value: f64 },

    #[error("min_quota {min} exceeds max_quota {max}")]
    InvertedQuota { min: u32, max: u32 },

    #[error("cluster_size must be at least 1")]
    EmptyCluster,

    #[error("repair_threshold must be a finite, non-negative number, got {0}")]
    InvalidRepairThreshold(f64),
}
