//! Ore generation manager.
//!
//! Ties the ledger, the generation rules, and the chunk scanner together
//! behind the two calls a host server makes: [`ensure_generated`] from its
//! chunk-load handler and [`shutdown`] from its disable hook.
//!
//! Every failure is absorbed here and reported through `tracing` and the
//! returned [`GenerationOutcome`]; nothing escapes to the host as a panic.
//!
//! [`ensure_generated`]: OreGenerationManager::ensure_generated
//! [`shutdown`]: OreGenerationManager::shutdown

pub mod config;
pub mod decision;
pub mod error;
pub mod manager;
pub mod outcome;
pub mod rules;

pub use config::{EngineConfig, OreConfig};
pub use decision::RepairDecision;
pub use error::{EngineError, EngineResult};
pub use manager::OreGenerationManager;
pub use outcome::{GenerationOutcome, GenerationState};
pub use rules::{OreRule, RuleRegistry};
