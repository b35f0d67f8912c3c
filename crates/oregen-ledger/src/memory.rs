use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use oregen_types::{ChunkKey, EntrySource, LedgerEntry, OreTypeId, WorldId};

use crate::error::{LedgerError, LedgerResult};
use crate::legacy::LegacyConfig;
use crate::traits::{ChunkLedger, ChunkStatus, MarkOutcome};

/// In-memory generation ledger.
///
/// Intended for tests and embedding. Mirrors [`SqliteLedger`] semantics,
/// including the legacy rule and shutdown behaviour, with all state held
/// behind a `RwLock`.
///
/// [`SqliteLedger`]: crate::SqliteLedger
pub struct InMemoryLedger {
    inner: RwLock<Option<LedgerState>>,
    legacy: LegacyConfig,
}

#[derive(Default)]
struct LedgerState {
    entries: BTreeMap<ChunkKey, DateTime<Utc>>,
    legacy: BTreeMap<(WorldId, i32, i32), DateTime<Utc>>,
}

impl InMemoryLedger {
    pub fn new(legacy: LegacyConfig) -> Self {
        Self {
            inner: RwLock::new(Some(LedgerState::default())),
            legacy,
        }
    }

    /// Seed a legacy-table row. Returns `true` if the row is new.
    pub fn insert_legacy(&self, world: WorldId, chunk_x: i32, chunk_z: i32) -> LedgerResult<bool> {
        if self.legacy.ore_type.is_none() {
            return Err(LedgerError::LegacyDisabled);
        }
        let mut guard = self.inner.write().map_err(|_| LedgerError::LockPoisoned)?;
        let state = guard.as_mut().ok_or(LedgerError::Unavailable)?;
        let fresh = !state.legacy.contains_key(&(world, chunk_x, chunk_z));
        state
            .legacy
            .entry((world, chunk_x, chunk_z))
            .or_insert_with(Utc::now);
        Ok(fresh)
    }

    /// Number of rows in the unified ledger.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|s| s.entries.len()))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn legacy_covers(&self, state: &LedgerState, key: &ChunkKey) -> bool {
        self.legacy.applies_to(key.ore_type.as_str())
            && state
                .legacy
                .contains_key(&(key.world, key.chunk_x, key.chunk_z))
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new(LegacyConfig::default())
    }
}

impl ChunkLedger for InMemoryLedger {
    fn mark_chunk_generated(&self, key: &ChunkKey) -> LedgerResult<MarkOutcome> {
        let mut guard = self.inner.write().map_err(|_| LedgerError::LockPoisoned)?;
        let state = guard.as_mut().ok_or(LedgerError::Unavailable)?;

        if self.legacy_covers(state, key) {
            return Ok(MarkOutcome::LegacyCovered);
        }
        if state.entries.contains_key(key) {
            return Ok(MarkOutcome::AlreadyPresent);
        }
        state.entries.insert(key.clone(), Utc::now());
        Ok(MarkOutcome::Inserted)
    }

    fn status(&self, key: &ChunkKey) -> LedgerResult<ChunkStatus> {
        let guard = self.inner.read().map_err(|_| LedgerError::LockPoisoned)?;
        let state = guard.as_ref().ok_or(LedgerError::Unavailable)?;

        if state.entries.contains_key(key) {
            Ok(ChunkStatus::Recorded)
        } else if self.legacy_covers(state, key) {
            Ok(ChunkStatus::LegacyCovered)
        } else {
            Ok(ChunkStatus::Unseen)
        }
    }

    fn load_entries(&self, ore_type: &str) -> LedgerResult<Vec<LedgerEntry>> {
        let Ok(ore) = OreTypeId::new(ore_type) else {
            return Ok(Vec::new());
        };
        let guard = self.inner.read().map_err(|_| LedgerError::LockPoisoned)?;
        let state = guard.as_ref().ok_or(LedgerError::Unavailable)?;

        let mut merged: BTreeMap<ChunkKey, LedgerEntry> = BTreeMap::new();
        if self.legacy.applies_to(ore.as_str()) {
            for (&(world, x, z), at) in &state.legacy {
                let key = ChunkKey::new(ore.clone(), world, x, z);
                merged.insert(key.clone(), LedgerEntry::new(key, *at, EntrySource::Legacy));
            }
        }
        for (key, at) in state.entries.iter().filter(|(k, _)| k.ore_type == ore) {
            merged.insert(
                key.clone(),
                LedgerEntry::new(key.clone(), *at, EntrySource::Ledger),
            );
        }
        Ok(merged.into_values().collect())
    }

    fn shutdown(&self) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    fn is_open(&self) -> bool {
        self.inner.read().map(|g| g.is_some()).unwrap_or(false)
    }
}

impl std::fmt::Debug for InMemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLedger")
            .field("entry_count", &self.len())
            .field("open", &self.is_open())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn key(ore: &str, world: WorldId, x: i32, z: i32) -> ChunkKey {
        ChunkKey::new(OreTypeId::new(ore).unwrap(), world, x, z)
    }

    #[test]
    fn duplicate_mark_is_noop() {
        let ledger = InMemoryLedger::default();
        let k = key("test_ore", WorldId::random(), 4, 7);
        assert_eq!(ledger.mark_chunk_generated(&k).unwrap(), MarkOutcome::Inserted);
        assert_eq!(
            ledger.mark_chunk_generated(&k).unwrap(),
            MarkOutcome::AlreadyPresent
        );
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn shutdown_makes_everything_unavailable() {
        let ledger = InMemoryLedger::default();
        let k = key("test_ore", WorldId::random(), 0, 0);
        ledger.mark_chunk_generated(&k).unwrap();
        ledger.shutdown();
        ledger.shutdown();

        assert!(!ledger.is_open());
        assert!(ledger.mark_chunk_generated(&k).unwrap_err().is_unavailable());
        assert!(ledger.is_generated(&k).unwrap_err().is_unavailable());
        assert!(ledger.is_empty());
    }

    #[test]
    fn legacy_row_covers_only_the_legacy_ore() {
        let ledger = InMemoryLedger::default();
        let world = WorldId::random();
        assert!(ledger.insert_legacy(world, 1, 2).unwrap());
        assert!(!ledger.insert_legacy(world, 1, 2).unwrap());

        assert_eq!(
            ledger
                .mark_chunk_generated(&key("voidstone_ore", world, 1, 2))
                .unwrap(),
            MarkOutcome::LegacyCovered
        );
        assert!(ledger
            .mark_chunk_generated(&key("test_ore", world, 1, 2))
            .unwrap()
            .is_inserted());
        assert_eq!(ledger.load_generated_chunks("voidstone_ore").unwrap().len(), 1);
    }

    #[test]
    fn legacy_ore_is_ordinary_when_rule_disabled() {
        let ledger = InMemoryLedger::new(LegacyConfig::disabled());
        let k = key("voidstone_ore", WorldId::random(), 3, 3);
        ledger.mark_chunk_generated(&k).unwrap();
        assert_eq!(ledger.status(&k).unwrap(), ChunkStatus::Recorded);
        assert_eq!(ledger.load_entries("voidstone_ore").unwrap()[0].source, EntrySource::Ledger);
    }

    #[test]
    fn empty_id_loads_nothing() {
        let ledger = InMemoryLedger::default();
        ledger
            .mark_chunk_generated(&key("test_ore", WorldId::random(), 0, 0))
            .unwrap();
        assert!(ledger.load_generated_chunks("").unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn inserted_keys_round_trip_through_load(
            coords in proptest::collection::vec((-64i32..64, -64i32..64), 1..40)
        ) {
            let ledger = InMemoryLedger::default();
            let world = WorldId::random();
            let mut inserted = Vec::new();
            for (x, z) in coords {
                let k = key("test_ore", world, x, z);
                if ledger.mark_chunk_generated(&k).unwrap().is_inserted() {
                    inserted.push(k);
                }
            }
            let loaded = ledger.load_generated_chunks("test_ore").unwrap();
            prop_assert_eq!(loaded.len(), inserted.len());
            for k in &inserted {
                prop_assert!(loaded.contains(k));
            }
        }
    }
}
