//! `SQLite`-backed generation ledger.
//!
//! # Schema
//!
//! The unified `ore_generation_chunks` table has columns `ore_type`, `world`,
//! `chunk_x`, `chunk_z`, `generated_at` (epoch milliseconds), with the first
//! four forming the primary key.
//!
//! The legacy table (see [`LegacyConfig`]) has the same shape minus the
//! `ore_type` column; its primary key is `(world, chunk_x, chunk_z)`.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use oregen_types::{ChunkKey, EntrySource, LedgerEntry, OreTypeId, WorldId};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::legacy::LegacyConfig;
use crate::traits::{ChunkLedger, ChunkStatus, MarkOutcome};

/// File name used for the ledger database inside a data directory.
pub const DEFAULT_DATABASE_FILE: &str = "ore_generation.db";

const LEDGER_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS ore_generation_chunks (
    ore_type TEXT NOT NULL,
    world TEXT NOT NULL,
    chunk_x INTEGER NOT NULL,
    chunk_z INTEGER NOT NULL,
    generated_at INTEGER NOT NULL,
    PRIMARY KEY (ore_type, world, chunk_x, chunk_z)
)";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Generation ledger stored in a single `SQLite` database.
///
/// The connection sits behind a mutex that every operation holds for its
/// full duration, so operations from different host threads are serialised.
/// `None` in the mutex means the store is closed.
pub struct SqliteLedger {
    conn: Mutex<Option<Connection>>,
    legacy: LegacyConfig,
}

impl SqliteLedger {
    /// A ledger with no connection. Every operation reports
    /// [`LedgerError::Unavailable`] until [`open`](Self::open) succeeds.
    pub fn closed(legacy: LegacyConfig) -> Self {
        Self {
            conn: Mutex::new(None),
            legacy,
        }
    }

    /// Open (or create) the database at `path` and return a ready ledger.
    pub fn open_at(path: impl AsRef<Path>, legacy: LegacyConfig) -> LedgerResult<Self> {
        let ledger = Self::closed(legacy);
        ledger.open(path)?;
        Ok(ledger)
    }

    /// A private in-memory database, for tests.
    pub fn open_in_memory(legacy: LegacyConfig) -> LedgerResult<Self> {
        legacy.validate()?;
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn, &legacy)?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            legacy,
        })
    }

    /// Open (or create) the database at `path`, creating its parent
    /// directory and both tables if absent. Existing rows are left as-is.
    ///
    /// Replaces any connection this ledger already held.
    pub fn open(&self, path: impl AsRef<Path>) -> LedgerResult<()> {
        let path = path.as_ref();
        self.legacy.validate()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        Self::init_schema(&conn, &self.legacy)?;

        *self.lock()? = Some(conn);
        info!(path = %path.display(), journal_mode = %mode, "ore ledger opened");
        Ok(())
    }

    /// The legacy configuration this ledger was built with.
    pub fn legacy(&self) -> &LegacyConfig {
        &self.legacy
    }

    /// Insert a row into the legacy table. Returns `true` if the row is new.
    ///
    /// Intended for data tooling and tests that reproduce pre-unification
    /// worlds; normal generation never writes to the legacy table.
    pub fn insert_legacy(&self, world: WorldId, chunk_x: i32, chunk_z: i32) -> LedgerResult<bool> {
        if self.legacy.ore_type.is_none() {
            return Err(LedgerError::LegacyDisabled);
        }
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or(LedgerError::Unavailable)?;
        let changed = conn.execute(
            &format!(
                "INSERT OR IGNORE INTO {} (world, chunk_x, chunk_z, generated_at) VALUES (?1, ?2, ?3, ?4)",
                self.legacy.table
            ),
            params![world.to_string(), chunk_x, chunk_z, Utc::now().timestamp_millis()],
        )?;
        Ok(changed == 1)
    }

    fn init_schema(conn: &Connection, legacy: &LegacyConfig) -> LedgerResult<()> {
        conn.execute(LEDGER_TABLE_SQL, [])?;
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    world TEXT NOT NULL,
                    chunk_x INTEGER NOT NULL,
                    chunk_z INTEGER NOT NULL,
                    generated_at INTEGER NOT NULL,
                    PRIMARY KEY (world, chunk_x, chunk_z)
                )",
                legacy.table
            ),
            [],
        )?;
        Ok(())
    }

    fn lock(&self) -> LedgerResult<MutexGuard<'_, Option<Connection>>> {
        self.conn.lock().map_err(|_| LedgerError::LockPoisoned)
    }

    fn legacy_row_exists(&self, conn: &Connection, key: &ChunkKey) -> LedgerResult<bool> {
        if !self.legacy.applies_to(key.ore_type.as_str()) {
            return Ok(false);
        }
        let found = conn
            .prepare_cached(&format!(
                "SELECT 1 FROM {} WHERE world = ?1 AND chunk_x = ?2 AND chunk_z = ?3",
                self.legacy.table
            ))?
            .query_row(
                params![key.world.to_string(), key.chunk_x, key.chunk_z],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn ledger_row_exists(conn: &Connection, key: &ChunkKey) -> LedgerResult<bool> {
        let found = conn
            .prepare_cached(
                "SELECT 1 FROM ore_generation_chunks
                 WHERE ore_type = ?1 AND world = ?2 AND chunk_x = ?3 AND chunk_z = ?4",
            )?
            .query_row(
                params![
                    key.ore_type.as_str(),
                    key.world.to_string(),
                    key.chunk_x,
                    key.chunk_z
                ],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

impl ChunkLedger for SqliteLedger {
    fn mark_chunk_generated(&self, key: &ChunkKey) -> LedgerResult<MarkOutcome> {
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or(LedgerError::Unavailable)?;

        if self.legacy_row_exists(conn, key)? {
            debug!(key = %key, "chunk covered by legacy table");
            return Ok(MarkOutcome::LegacyCovered);
        }

        let changed = conn
            .prepare_cached(
                "INSERT OR IGNORE INTO ore_generation_chunks
                 (ore_type, world, chunk_x, chunk_z, generated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?
            .execute(params![
                key.ore_type.as_str(),
                key.world.to_string(),
                key.chunk_x,
                key.chunk_z,
                Utc::now().timestamp_millis()
            ])?;

        let outcome = if changed == 1 {
            MarkOutcome::Inserted
        } else {
            MarkOutcome::AlreadyPresent
        };
        debug!(key = %key, ?outcome, "mark chunk generated");
        Ok(outcome)
    }

    fn status(&self, key: &ChunkKey) -> LedgerResult<ChunkStatus> {
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or(LedgerError::Unavailable)?;

        if Self::ledger_row_exists(conn, key)? {
            Ok(ChunkStatus::Recorded)
        } else if self.legacy_row_exists(conn, key)? {
            Ok(ChunkStatus::LegacyCovered)
        } else {
            Ok(ChunkStatus::Unseen)
        }
    }

    fn load_entries(&self, ore_type: &str) -> LedgerResult<Vec<LedgerEntry>> {
        // Nothing can have been recorded under an id that fails validation.
        let Ok(ore) = OreTypeId::new(ore_type) else {
            return Ok(Vec::new());
        };

        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or(LedgerError::Unavailable)?;
        let mut merged: BTreeMap<ChunkKey, LedgerEntry> = BTreeMap::new();

        if self.legacy.applies_to(ore.as_str()) {
            let mut stmt = conn.prepare(&format!(
                "SELECT world, chunk_x, chunk_z, generated_at FROM {}",
                self.legacy.table
            ))?;
            let rows = stmt.query_map([], read_row)?;
            for row in rows {
                let entry = decode_row(&ore, row?, EntrySource::Legacy)?;
                merged.insert(entry.key.clone(), entry);
            }
        }

        let mut stmt = conn.prepare_cached(
            "SELECT world, chunk_x, chunk_z, generated_at
             FROM ore_generation_chunks WHERE ore_type = ?1",
        )?;
        let rows = stmt.query_map(params![ore.as_str()], read_row)?;
        for row in rows {
            let entry = decode_row(&ore, row?, EntrySource::Ledger)?;
            merged.insert(entry.key.clone(), entry);
        }

        Ok(merged.into_values().collect())
    }

    fn shutdown(&self) {
        let mut guard = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(conn) = guard.take() {
            match conn.close() {
                Ok(()) => info!("ore ledger closed"),
                Err((_, e)) => warn!(error = %e, "ore ledger did not close cleanly"),
            }
        }
    }

    fn is_open(&self) -> bool {
        self.lock().map(|guard| guard.is_some()).unwrap_or(false)
    }
}

impl std::fmt::Debug for SqliteLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteLedger")
            .field("open", &self.is_open())
            .field("legacy", &self.legacy)
            .finish()
    }
}

type RawRow = (String, i32, i32, i64);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode_row(
    ore: &OreTypeId,
    (world, chunk_x, chunk_z, generated_at): RawRow,
    source: EntrySource,
) -> LedgerResult<LedgerEntry> {
    let world = WorldId::parse(&world).map_err(|e| LedgerError::InvalidRow(e.to_string()))?;
    let generated_at = DateTime::<Utc>::from_timestamp_millis(generated_at)
        .ok_or_else(|| LedgerError::InvalidRow(format!("timestamp out of range: {generated_at}")))?;
    Ok(LedgerEntry::new(
        ChunkKey::new(ore.clone(), world, chunk_x, chunk_z),
        generated_at,
        source,
    ))
}
