use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use oregen_ledger::{ChunkLedger, ChunkStatus, MarkOutcome, SqliteLedger};
use oregen_scan::{
    plan_scan, BlockRegistry, ChunkScanner, ChunkView, CustomBlock, PlacementContext, ScanResult,
};
use oregen_types::{BlockPos, ChunkKey, GenerationRules, OreTypeId, WorldId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::decision::RepairDecision;
use crate::error::EngineResult;
use crate::outcome::{GenerationOutcome, GenerationState};
use crate::rules::RuleRegistry;

/// Coordinates the ledger, the rule registry, and the scanner.
///
/// One manager serves every host thread. Requests for distinct keys proceed
/// independently; requests for the same key are serialised by an in-flight
/// set, so within one process a chunk is scanned at most once per ore type.
pub struct OreGenerationManager<L, R> {
    ledger: L,
    registry: R,
    rules: RuleRegistry,
    database_file: String,
    rng: Mutex<StdRng>,
    in_flight: Mutex<HashSet<ChunkKey>>,
}

impl<L: ChunkLedger, R: BlockRegistry> OreGenerationManager<L, R> {
    /// Build a manager from explicit parts. `rng_seed` fixes the placement
    /// draws; `None` seeds from OS entropy.
    pub fn new(ledger: L, registry: R, rules: RuleRegistry, rng_seed: Option<u64>) -> Self {
        let rng = match rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            ledger,
            registry,
            rules,
            database_file: oregen_ledger::sqlite::DEFAULT_DATABASE_FILE.to_string(),
            rng: Mutex::new(rng),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    // ---- Chunk-load entry point ----

    /// Apply custom generation for `ore_type` to `chunk` unless the ledger
    /// says it already happened.
    ///
    /// `context` lists positions that already carry custom block data; they
    /// are never chosen for placement. The chunk is recorded only when its
    /// placements all succeed (or none were needed), so a rejected placement
    /// leaves it eligible for a retry on a later load.
    pub fn ensure_generated<C>(
        &self,
        ore_type: &OreTypeId,
        chunk: &C,
        context: Option<&PlacementContext>,
    ) -> GenerationOutcome
    where
        C: ChunkView + ?Sized,
    {
        let key = ChunkKey::new(
            ore_type.clone(),
            chunk.world(),
            chunk.chunk_x(),
            chunk.chunk_z(),
        );

        let Some(rule) = self.rules.get(ore_type) else {
            debug!(%key, "no rules registered for ore type");
            return GenerationOutcome::terminal(key, GenerationState::UnknownOre);
        };

        if !BlockPos::chunk_in_range(key.chunk_x, key.chunk_z) {
            warn!(%key, "chunk outside addressable coordinates; skipping generation");
            return GenerationOutcome::terminal(key, GenerationState::OutOfRange);
        }

        let Some(_claim) = self.claim(&key) else {
            debug!(%key, "chunk already being processed");
            return GenerationOutcome::terminal(key, GenerationState::InFlight);
        };

        match self.ledger.status(&key) {
            Ok(ChunkStatus::Unseen) => {}
            Ok(ChunkStatus::Recorded) => {
                debug!(%key, "chunk already generated");
                return GenerationOutcome::terminal(key, GenerationState::Recorded);
            }
            Ok(ChunkStatus::LegacyCovered) => {
                debug!(%key, "chunk covered by legacy ledger");
                return GenerationOutcome::terminal(key, GenerationState::LegacyCovered);
            }
            Err(error) => {
                warn!(%key, %error, "ledger lookup failed; skipping generation");
                return GenerationOutcome::terminal(key, GenerationState::Degraded);
            }
        }

        let plan = plan_scan(chunk, &rule.rules, context, &mut self.scan_rng());
        let decision = RepairDecision::evaluate(plan.target_matches, &rule.rules);

        let scan = if decision.places_blocks() {
            ChunkScanner::new(&self.registry).commit(chunk, &rule.block, plan)
        } else {
            debug!(
                %key,
                target_matches = plan.target_matches,
                "chunk already populated; recording without placement"
            );
            ScanResult::counted(plan.target_matches)
        };

        let mut outcome = GenerationOutcome {
            key,
            state: GenerationState::Scanned,
            decision: Some(decision),
            scan: None,
            newly_recorded: false,
        };

        if !scan.is_complete() {
            warn!(
                key = %outcome.key,
                placed = scan.registered_blocks,
                "placement incomplete; chunk left unrecorded"
            );
            outcome.scan = Some(scan);
            return outcome;
        }

        match self.ledger.mark_chunk_generated(&outcome.key) {
            Ok(MarkOutcome::Inserted) => {
                info!(
                    key = %outcome.key,
                    target_matches = scan.target_matches,
                    placed = scan.registered_blocks,
                    ?decision,
                    "chunk generated"
                );
                outcome.state = GenerationState::Recorded;
                outcome.newly_recorded = true;
            }
            Ok(MarkOutcome::AlreadyPresent) => {
                debug!(key = %outcome.key, "chunk recorded by another writer");
                outcome.state = GenerationState::Recorded;
            }
            Ok(MarkOutcome::LegacyCovered) => {
                debug!(key = %outcome.key, "chunk covered by legacy ledger");
                outcome.state = GenerationState::LegacyCovered;
            }
            Err(error) => {
                warn!(
                    key = %outcome.key,
                    %error,
                    placed = scan.registered_blocks,
                    "ledger write failed after scan"
                );
                outcome.state = GenerationState::Degraded;
            }
        }
        outcome.scan = Some(scan);
        outcome
    }

    // ---- Compatibility operations ----

    /// Record a chunk directly. Returns `true` only when a new entry was
    /// written; duplicates, legacy coverage, bad identifiers, and ledger
    /// failures all yield `false`.
    pub fn mark_chunk_generated(
        &self,
        ore_type: &str,
        world: WorldId,
        chunk_x: i32,
        chunk_z: i32,
    ) -> bool {
        let Some(key) = Self::key(ore_type, world, chunk_x, chunk_z) else {
            return false;
        };
        match self.ledger.mark_chunk_generated(&key) {
            Ok(outcome) => {
                debug!(%key, ?outcome, "chunk mark");
                outcome.is_inserted()
            }
            Err(error) => {
                warn!(%key, %error, "chunk mark failed");
                false
            }
        }
    }

    /// Returns `true` if either the ledger or the legacy table records the
    /// chunk. Failures read as `false`.
    pub fn is_generated(&self, ore_type: &str, world: WorldId, chunk_x: i32, chunk_z: i32) -> bool {
        let Some(key) = Self::key(ore_type, world, chunk_x, chunk_z) else {
            return false;
        };
        self.ledger.is_generated(&key).unwrap_or_else(|error| {
            warn!(%key, %error, "chunk lookup failed");
            false
        })
    }

    /// Every recorded key for `ore_type`. `None`, an empty identifier, or a
    /// ledger failure yields an empty list.
    pub fn load_generated_chunks(&self, ore_type: Option<&str>) -> Vec<ChunkKey> {
        let Some(ore_type) = ore_type.filter(|s| !s.is_empty()) else {
            return Vec::new();
        };
        self.ledger
            .load_generated_chunks(ore_type)
            .unwrap_or_else(|error| {
                warn!(ore_type, %error, "loading generated chunks failed");
                Vec::new()
            })
    }

    /// Scan and place with caller-supplied rules, bypassing the ledger.
    pub fn scan_chunk_for_repair<C>(
        &self,
        chunk: &C,
        block: &CustomBlock,
        rules: &GenerationRules,
        context: Option<&PlacementContext>,
    ) -> ScanResult
    where
        C: ChunkView + ?Sized,
    {
        ChunkScanner::new(&self.registry).scan_chunk_for_repair(
            chunk,
            block,
            rules,
            context,
            &mut self.scan_rng(),
        )
    }

    // ---- Lifecycle ----

    /// Close the ledger. Safe without a prior open and safe to repeat.
    pub fn shutdown(&self) {
        self.ledger.shutdown();
        info!("ore generation manager shut down");
    }

    // ---- Internal ----

    fn key(ore_type: &str, world: WorldId, chunk_x: i32, chunk_z: i32) -> Option<ChunkKey> {
        match OreTypeId::new(ore_type) {
            Ok(ore) => Some(ChunkKey::new(ore, world, chunk_x, chunk_z)),
            Err(error) => {
                warn!(ore_type, %error, "invalid ore type");
                None
            }
        }
    }

    /// A generator for one scan, seeded from the shared one. The shared lock
    /// is held only for the draw, so scans of different chunks run in
    /// parallel.
    fn scan_rng(&self) -> StdRng {
        let seed = self.rng.lock().unwrap_or_else(PoisonError::into_inner).gen();
        StdRng::seed_from_u64(seed)
    }

        fn claim(&self, key: &ChunkKey) -> Option<InFlight<'_>> {
        let mut set = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        set.insert(key.clone()).then(|| InFlight {
            set: &self.in_flight,
            key: key.clone(),
        })
    }
}

impl<R: BlockRegistry> OreGenerationManager<SqliteLedger, R> {
    /// A manager over a closed SQLite ledger, ready for
    /// [`initialize`](Self::initialize).
    pub fn from_config(config: &EngineConfig, registry: R) -> EngineResult<Self> {
        let rules = RuleRegistry::from_config(config)?;
        let ledger = SqliteLedger::closed(config.legacy.clone());
        let mut manager = Self::new(ledger, registry, rules, config.rng_seed);
        manager.database_file.clone_from(&config.database_file);
        Ok(manager)
    }

    /// Open `<data_dir>/<database_file>`, creating the directory, the file,
    /// and both tables as needed.
    pub fn initialize(&self, data_dir: impl AsRef<Path>) -> EngineResult<()> {
        let path = data_dir.as_ref().join(&self.database_file);
        self.ledger.open(&path)?;
        info!(
            path = %path.display(),
            ores = self.rules.len(),
            "ore generation manager initialized"
        );
        Ok(())
    }
}

impl<L: std::fmt::Debug, R> std::fmt::Debug for OreGenerationManager<L, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let in_flight = self
            .in_flight
            .lock()
            .map(|set| set.len())
            .unwrap_or_default();
        f.debug_struct("OreGenerationManager")
            .field("ledger", &self.ledger)
            .field("ores", &self.rules.len())
            .field("in_flight", &in_flight)
            .finish()
    }
}

/// Removes its key from the in-flight set when dropped.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<ChunkKey>>,
    key: ChunkKey,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oregen_ledger::{InMemoryLedger, LegacyConfig};
    use oregen_scan::{InMemoryBlockRegistry, InMemoryChunk};
    use oregen_types::Material;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn ore(id: &str) -> OreTypeId {
        OreTypeId::new(id).unwrap()
    }

    fn rules(max_quota: u32) -> GenerationRules {
        GenerationRules::builder()
            .height_range(0, 15)
            .spawn_probability(1.0)
            .quota(0, max_quota)
            .target("note_block")
            .build()
            .unwrap()
    }

    fn registry_with(ore_type: &str, rules: GenerationRules) -> RuleRegistry {
        let mut registry = RuleRegistry::new();
        registry.insert(ore(ore_type), "note_block", rules).unwrap();
        registry
    }

    fn stone_chunk(world: WorldId, x: i32, z: i32) -> InMemoryChunk {
        InMemoryChunk::new(world, x, z, 0, 16, "stone")
    }

    fn memory_manager(
        ore_type: &str,
        max_quota: u32,
    ) -> OreGenerationManager<InMemoryLedger, InMemoryBlockRegistry> {
        OreGenerationManager::new(
            InMemoryLedger::default(),
            InMemoryBlockRegistry::new(),
            registry_with(ore_type, rules(max_quota)),
            Some(1),
        )
    }

    // ---- ensure_generated ----

    #[test]
    fn fresh_chunk_is_generated_and_recorded() {
        let manager = memory_manager("test_ore", 3);
        let world = WorldId::random();
        let chunk = stone_chunk(world, 0, 0);

        let outcome = manager.ensure_generated(&ore("test_ore"), &chunk, None);
        assert_eq!(outcome.state, GenerationState::Recorded);
        assert_eq!(outcome.decision, Some(RepairDecision::Generate));
        assert!(outcome.newly_recorded);
        assert_eq!(outcome.placed_blocks(), 3);
        assert_eq!(manager.registry().placed_count(), 3);
        assert!(manager.is_generated("test_ore", world, 0, 0));

        let placed = manager
            .registry()
            .block_at(world, BlockPos::new(0, 0, 0))
            .unwrap();
        assert_eq!(placed.ore_type, ore("test_ore"));
    }

    #[test]
    fn recorded_chunk_takes_cheap_path() {
        let manager = memory_manager("test_ore", 3);
        let chunk = stone_chunk(WorldId::random(), 2, -1);

        manager.ensure_generated(&ore("test_ore"), &chunk, None);
        let again = manager.ensure_generated(&ore("test_ore"), &chunk, None);
        assert_eq!(again.state, GenerationState::Recorded);
        assert!(!again.newly_recorded);
        assert!(again.scan.is_none());
        assert_eq!(manager.registry().placed_count(), 3);
    }

    #[test]
    fn populated_chunk_is_recorded_without_placement() {
        let manager = memory_manager("test_ore", 3);
        let mut chunk = stone_chunk(WorldId::random(), 0, 0);
        chunk.set(5, 3, 5, "note_block");

        let outcome = manager.ensure_generated(&ore("test_ore"), &chunk, None);
        assert_eq!(outcome.state, GenerationState::Recorded);
        assert_eq!(outcome.decision, Some(RepairDecision::AlreadyPopulated));
        let scan = outcome.scan.unwrap();
        assert_eq!(scan.target_matches, 1);
        assert_eq!(scan.registered_blocks, 0);
        assert_eq!(manager.registry().placed_count(), 0);
    }

    #[test]
    fn unknown_ore_is_left_alone() {
        let manager = memory_manager("test_ore", 3);
        let world = WorldId::random();
        let outcome = manager.ensure_generated(&ore("mystery_ore"), &stone_chunk(world, 0, 0), None);
        assert_eq!(outcome.state, GenerationState::UnknownOre);
        assert!(!manager.is_generated("mystery_ore", world, 0, 0));
        assert_eq!(manager.registry().placed_count(), 0);
    }

    #[test]
    fn legacy_chunk_is_not_rescanned() {
        let manager = memory_manager("voidstone_ore", 3);
        let world = WorldId::random();
        manager.ledger().insert_legacy(world, 4, 4).unwrap();

        let outcome =
            manager.ensure_generated(&ore("voidstone_ore"), &stone_chunk(world, 4, 4), None);
        assert_eq!(outcome.state, GenerationState::LegacyCovered);
        assert!(outcome.scan.is_none());
        assert_eq!(manager.registry().placed_count(), 0);
        assert_eq!(manager.load_generated_chunks(Some("voidstone_ore")).len(), 1);
    }

    #[test]
    fn rejected_placement_leaves_chunk_unrecorded() {
        let manager = memory_manager("test_ore", 3);
        let world = WorldId::random();
        let chunk = stone_chunk(world, 0, 0);
        manager.registry().reject_at(BlockPos::new(0, 1, 0));

        let outcome = manager.ensure_generated(&ore("test_ore"), &chunk, None);
        assert_eq!(outcome.state, GenerationState::Scanned);
        let scan = outcome.scan.unwrap();
        assert_eq!(scan.registered_blocks, 1);
        assert_eq!(scan.failure.unwrap().pos, BlockPos::new(0, 1, 0));
        assert!(!manager.is_generated("test_ore", world, 0, 0));

        manager.registry().clear_rejections();
        let context = manager.registry().context_for(world, 0, 0);
        let retry = manager.ensure_generated(&ore("test_ore"), &chunk, Some(&context));
        assert_eq!(retry.state, GenerationState::Recorded);
        assert_eq!(retry.placed_blocks(), 3);
        assert_eq!(manager.registry().placed_count(), 4);
    }

    #[test]
    fn closed_ledger_degrades_without_placing() {
        let manager = OreGenerationManager::new(
            SqliteLedger::closed(LegacyConfig::default()),
            InMemoryBlockRegistry::new(),
            registry_with("test_ore", rules(3)),
            None,
        );
        let outcome =
            manager.ensure_generated(&ore("test_ore"), &stone_chunk(WorldId::random(), 0, 0), None);
        assert_eq!(outcome.state, GenerationState::Degraded);
        assert_eq!(manager.registry().placed_count(), 0);
    }

    #[test]
    fn claimed_key_reports_in_flight() {
        let manager = memory_manager("test_ore", 3);
        let chunk = stone_chunk(WorldId::random(), 0, 0);
        let key = ChunkKey::new(ore("test_ore"), chunk.world(), 0, 0);

        let claim = manager.claim(&key).unwrap();
        assert!(manager.claim(&key).is_none());
        let outcome = manager.ensure_generated(&ore("test_ore"), &chunk, None);
        assert_eq!(outcome.state, GenerationState::InFlight);
        assert_eq!(manager.registry().placed_count(), 0);

        drop(claim);
        assert!(manager.claim(&key).is_some());
    }

    #[test]
    fn far_chunk_is_skipped_without_recording() {
        let manager = memory_manager("test_ore", 1);
        let world = WorldId::random();
        let chunk = InMemoryChunk::new(world, 200_000_000, 0, 0, 4, "stone");

        let outcome = manager.ensure_generated(&ore("test_ore"), &chunk, None);
        assert_eq!(outcome.state, GenerationState::OutOfRange);
        assert!(outcome.scan.is_none());
        assert!(!manager.is_generated("test_ore", world, 200_000_000, 0));
        assert_eq!(manager.registry().placed_count(), 0);
    }

    /// Delegates to an [`InMemoryChunk`] and notes whether the manager's
    /// shared generator was locked during any material read.
    struct LockWatchingChunk<'a> {
        inner: InMemoryChunk,
        rng: &'a Mutex<StdRng>,
        locked_during_read: AtomicBool,
    }

    impl ChunkView for LockWatchingChunk<'_> {
        fn world(&self) -> WorldId {
            self.inner.world()
        }

        fn chunk_x(&self) -> i32 {
            self.inner.chunk_x()
        }

        fn chunk_z(&self) -> i32 {
            self.inner.chunk_z()
        }

        fn min_height(&self) -> i32 {
            self.inner.min_height()
        }

        fn max_height(&self) -> i32 {
            self.inner.max_height()
        }

        fn material_at(&self, local_x: i32, y: i32, local_z: i32) -> Material {
            if self.rng.try_lock().is_err() {
                self.locked_during_read.store(true, Ordering::SeqCst);
            }
            self.inner.material_at(local_x, y, local_z)
        }
    }

    #[test]
    fn shared_generator_is_free_during_traversal() {
        let manager = memory_manager("test_ore", 3);
        let chunk = LockWatchingChunk {
            inner: stone_chunk(WorldId::random(), 0, 0),
            rng: &manager.rng,
            locked_during_read: AtomicBool::new(false),
        };

        let outcome = manager.ensure_generated(&ore("test_ore"), &chunk, None);
        assert_eq!(outcome.placed_blocks(), 3);
        let block = CustomBlock::new(ore("test_ore"), "note_block");
        manager.scan_chunk_for_repair(&chunk, &block, &rules(0), None);
        assert!(!chunk.locked_during_read.load(Ordering::SeqCst));
    }

    #[test]
    fn concurrent_loads_generate_once() {
        let manager = memory_manager("test_ore", 3);
        let chunk = stone_chunk(WorldId::random(), 7, 7);

        let outcomes: Vec<GenerationOutcome> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| manager.ensure_generated(&ore("test_ore"), &chunk, None)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(outcomes.iter().filter(|o| o.newly_recorded).count(), 1);
        assert_eq!(manager.registry().placed_count(), 3);
    }

    #[test]
    fn seeded_managers_place_identically() {
        let rules = GenerationRules::builder()
            .height_range(0, 15)
            .spawn_probability(0.05)
            .secondary_probability(0.5)
            .cluster_size(3)
            .quota(0, 10)
            .build()
            .unwrap();
        let world = WorldId::random();
        let chunk = stone_chunk(world, 0, 0);

        let placed: Vec<Vec<Option<CustomBlock>>> = (0..2)
            .map(|_| {
                let manager = OreGenerationManager::new(
                    InMemoryLedger::default(),
                    InMemoryBlockRegistry::new(),
                    registry_with("test_ore", rules.clone()),
                    Some(99),
                );
                manager.ensure_generated(&ore("test_ore"), &chunk, None);
                (0..16)
                    .flat_map(|y| (0..16).map(move |x| BlockPos::new(x, y, 0)))
                    .map(|pos| manager.registry().block_at(world, pos))
                    .collect()
            })
            .collect();
        assert_eq!(placed[0], placed[1]);
    }

    // ---- Compatibility operations ----

    #[test]
    fn mark_is_idempotent() {
        let manager = memory_manager("test_ore", 3);
        let world = WorldId::random();
        assert!(manager.mark_chunk_generated("test_ore", world, 1, 2));
        assert!(!manager.mark_chunk_generated("test_ore", world, 1, 2));
        assert!(manager.is_generated("test_ore", world, 1, 2));
        assert!(!manager.is_generated("test_ore", world, 2, 1));
    }

    #[test]
    fn invalid_identifiers_read_as_false() {
        let manager = memory_manager("test_ore", 3);
        let world = WorldId::random();
        assert!(!manager.mark_chunk_generated("", world, 0, 0));
        assert!(!manager.mark_chunk_generated("Not An Ore", world, 0, 0));
        assert!(!manager.is_generated("", world, 0, 0));
    }

    #[test]
    fn load_with_missing_ore_type_is_empty() {
        let manager = memory_manager("test_ore", 3);
        manager.mark_chunk_generated("test_ore", WorldId::random(), 0, 0);
        assert!(manager.load_generated_chunks(None).is_empty());
        assert!(manager.load_generated_chunks(Some("")).is_empty());
        assert_eq!(manager.load_generated_chunks(Some("test_ore")).len(), 1);
    }

    #[test]
    fn marked_chunks_round_trip() {
        let manager = memory_manager("test_ore", 3);
        let world = WorldId::random();
        for (x, z) in [(0, 0), (-3, 9), (12, -12)] {
            assert!(manager.mark_chunk_generated("test_ore", world, x, z));
        }
        let loaded = manager.load_generated_chunks(Some("test_ore"));
        assert_eq!(loaded.len(), 3);
        for (x, z) in [(0, 0), (-3, 9), (12, -12)] {
            assert!(loaded.contains(&ChunkKey::new(ore("test_ore"), world, x, z)));
        }
    }

    #[test]
    fn direct_scan_single_match_with_zero_quota() {
        let manager = memory_manager("test_ore", 3);
        let mut chunk = stone_chunk(WorldId::random(), 0, 0);
        chunk.set(3, 4, 5, "note_block");
        let block = CustomBlock::new(ore("test_ore"), "note_block");

        let result = manager.scan_chunk_for_repair(&chunk, &block, &rules(0), None);
        assert_eq!(result.target_matches, 1);
        assert_eq!(result.registered_blocks, 0);
    }

    // ---- Lifecycle ----

    fn sqlite_manager() -> OreGenerationManager<SqliteLedger, InMemoryBlockRegistry> {
        let mut config = EngineConfig::default();
        config.rng_seed = Some(5);
        config.ores.insert(
            "test_ore".into(),
            crate::config::OreConfig {
                appearance: "note_block".into(),
                rules: rules(2),
            },
        );
        OreGenerationManager::from_config(&config, InMemoryBlockRegistry::new()).unwrap()
    }

    #[test]
    fn initialize_opens_database_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("plugins").join("oregen");
        let manager = sqlite_manager();

        manager.initialize(&data_dir).unwrap();
        assert!(data_dir.join("ore_generation.db").exists());

        let outcome =
            manager.ensure_generated(&ore("test_ore"), &stone_chunk(WorldId::random(), 0, 0), None);
        assert_eq!(outcome.state, GenerationState::Recorded);
        assert_eq!(outcome.placed_blocks(), 2);
    }

    #[test]
    fn records_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        let world = WorldId::random();

        let first = sqlite_manager();
        first.initialize(dir.path()).unwrap();
        assert!(first.mark_chunk_generated("test_ore", world, 3, 3));
        first.shutdown();

        let second = sqlite_manager();
        second.initialize(dir.path()).unwrap();
        assert!(second.is_generated("test_ore", world, 3, 3));
        let outcome = second.ensure_generated(&ore("test_ore"), &stone_chunk(world, 3, 3), None);
        assert_eq!(outcome.state, GenerationState::Recorded);
        assert_eq!(second.registry().placed_count(), 0);
    }

    #[test]
    fn shutdown_is_idempotent_and_disables_operations() {
        let dir = tempfile::tempdir().unwrap();
        let manager = sqlite_manager();
        manager.shutdown();

        manager.initialize(dir.path()).unwrap();
        manager.shutdown();
        manager.shutdown();

        let world = WorldId::random();
        assert!(!manager.mark_chunk_generated("test_ore", world, 0, 0));
        assert!(!manager.is_generated("test_ore", world, 0, 0));
        assert!(manager.load_generated_chunks(Some("test_ore")).is_empty());
        let outcome = manager.ensure_generated(&ore("test_ore"), &stone_chunk(world, 0, 0), None);
        assert_eq!(outcome.state, GenerationState::Degraded);
    }

    #[test]
    fn custom_database_file_is_honoured() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig {
            database_file: "ledger.sqlite".into(),
            ..EngineConfig::default()
        };
        let manager =
            OreGenerationManager::from_config(&config, InMemoryBlockRegistry::new()).unwrap();
        manager.initialize(dir.path()).unwrap();
        assert!(dir.path().join("ledger.sqlite").exists());
        assert!(manager.rules().is_empty());
    }
}
