//! Foundation types for the ore-generation ledger.
//!
//! This crate provides the identity, key, and rule types shared by the
//! ledger store, the chunk scanner, and the generation manager. Every other
//! `oregen` crate depends on `oregen-types`.
//!
//! # Key Types
//!
//! - [`OreTypeId`] -- Identifier naming a custom ore variant
//! - [`WorldId`] -- UUID of the world a chunk belongs to
//! - [`ChunkKey`] -- (ore type, world, chunk x, chunk z) ledger primary key
//! - [`LedgerEntry`] -- A recorded generation with its timestamp and source
//! - [`Material`] -- Block material identifier
//! - [`BlockPos`] -- World-space block position
//! - [`GenerationRules`] -- Validated per-ore generation parameters

pub mod chunk;
pub mod error;
pub mod ids;
pub mod material;
pub mod rules;

pub use chunk::{BlockPos, ChunkKey, EntrySource, LedgerEntry, CHUNK_WIDTH};
pub use error::{RulesError, TypeError};
pub use ids::{OreTypeId, WorldId};
pub use material::Material;
pub use rules::{GenerationRules, RulesBuilder};
