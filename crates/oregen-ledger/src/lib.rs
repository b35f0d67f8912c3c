//! Generation ledger for custom ore placement.
//!
//! The ledger durably records, per ore type and per world chunk, that custom
//! generation has already been applied. It is the dedup authority behind the
//! at-most-once guarantee: a [`ChunkKey`](oregen_types::ChunkKey) can be
//! marked exactly once, and every later mark reports the existing row.
//!
//! # Backends
//!
//! All backends implement the [`ChunkLedger`] trait:
//!
//! - [`SqliteLedger`] -- file-backed store with a unified ledger table and
//!   one legacy table for the grandfathered ore type
//! - [`InMemoryLedger`] -- map-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Entries are immutable once written; a duplicate mark is a no-op.
//! 2. The storage-level uniqueness constraint resolves concurrent marks.
//! 3. For the legacy ore type, a legacy row wins over a new mark.
//! 4. A closed or never-opened ledger reports [`LedgerError::Unavailable`]
//!    from every operation instead of panicking.

pub mod error;
pub mod legacy;
pub mod memory;
pub mod sqlite;
pub mod traits;

pub use error::{LedgerError, LedgerResult};
pub use legacy::LegacyConfig;
pub use memory::InMemoryLedger;
pub use sqlite::SqliteLedger;
pub use traits::{ChunkLedger, ChunkStatus, MarkOutcome};
