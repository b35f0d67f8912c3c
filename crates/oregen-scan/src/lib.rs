//! Chunk scanning and custom ore placement.
//!
//! A scan walks the 16×16 footprint of a chunk across the height range of a
//! [`GenerationRules`](oregen_types::GenerationRules) value. It counts the
//! blocks that already match the rules' target materials and, where
//! generation is warranted, places custom blocks through a
//! [`BlockRegistry`].
//!
//! Scans run in two phases. [`plan_scan`] performs the whole traversal with
//! no side effects and yields a [`ScanPlan`]; [`ChunkScanner::commit`] then
//! hands the planned positions to the registry in traversal order. Callers
//! that only need counts, or that want to decide on placement after seeing
//! the counts, stop after the first phase.
//!
//! # Modules
//!
//! - [`traits`] -- [`ChunkView`] and [`BlockRegistry`] host seams
//! - [`scanner`] -- Planning, commit, and [`ScanResult`]
//! - [`memory`] -- In-memory chunk and registry for tests and tooling

pub mod error;
pub mod memory;
pub mod scanner;
pub mod traits;

pub use error::{PlacementError, ScanFailure};
pub use memory::{InMemoryBlockRegistry, InMemoryChunk};
pub use scanner::{plan_scan, ChunkScanner, CustomBlock, PlacementContext, ScanPlan, ScanResult};
pub use traits::{BlockRegistry, ChunkView};
