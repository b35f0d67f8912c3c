use std::collections::BTreeMap;
use std::path::Path;

use oregen_ledger::LegacyConfig;
use oregen_types::{GenerationRules, Material};
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

/// Engine configuration, usually read from `oregen.toml`.
///
/// ```toml
/// database_file = "ore_generation.db"
///
/// [legacy]
/// ore_type = "voidstone_ore"
/// table = "voidstone_ore_chunks"
///
/// [ores.voidstone_ore]
/// appearance = "note_block"
///
/// [ores.voidstone_ore.rules]
/// min_y = -64
/// max_y = 0
/// spawn_probability = 0.01
/// max_quota = 8
/// target_materials = ["note_block"]
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Ledger file name, relative to the data directory.
    pub database_file: String,
    /// Fixed seed for placement draws; `None` seeds from OS entropy.
    pub rng_seed: Option<u64>,
    pub legacy: LegacyConfig,
    pub ores: BTreeMap<String, OreConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_file: oregen_ledger::sqlite::DEFAULT_DATABASE_FILE.to_string(),
            rng_seed: None,
            legacy: LegacyConfig::default(),
            ores: BTreeMap::new(),
        }
    }
}

/// Per-ore section of the config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OreConfig {
    /// Vanilla material the placed custom block is rendered as.
    pub appearance: Material,
    pub rules: GenerationRules,
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> EngineResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Read the config at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> EngineResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    const SAMPLE: &str = r#"
        rng_seed = 42

        [legacy]
        ore_type = "voidstone_ore"
        table = "voidstone_ore_chunks"

        [ores.voidstone_ore]
        appearance = "note_block"

        [ores.voidstone_ore.rules]
        min_y = -64
        max_y = 0
        spawn_probability = 0.01
        secondary_probability = 0.4
        min_quota = 2
        max_quota = 8
        cluster_size = 3
        repair_threshold = 0.5
        excluded_materials = ["bedrock"]
        target_materials = ["note_block"]
    "#;

    #[test]
    fn default_config() {
        let c = EngineConfig::default();
        assert_eq!(c.database_file, "ore_generation.db");
        assert!(c.rng_seed.is_none());
        assert!(c.legacy.applies_to("voidstone_ore"));
        assert!(c.ores.is_empty());
    }

    #[test]
    fn parses_full_sample() {
        let c = EngineConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(c.database_file, "ore_generation.db");
        assert_eq!(c.rng_seed, Some(42));
        let ore = &c.ores["voidstone_ore"];
        assert_eq!(ore.appearance, Material::new("note_block"));
        assert_eq!(ore.rules.max_quota(), 8);
        assert_eq!(ore.rules.cluster_size(), 3);
    }

    #[test]
    fn invalid_rules_fail_parsing() {
        let text = r#"
            [ores.bad_ore]
            appearance = "note_block"
            [ores.bad_ore.rules]
            min_y = 10
            max_y = -10
        "#;
        assert!(matches!(
            EngineConfig::from_toml_str(text),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn legacy_section_without_ore_type_disables_rule() {
        let c = EngineConfig::from_toml_str("[legacy]\ntable = \"old_chunks\"\n").unwrap();
        assert_eq!(c.legacy.ore_type, None);
        assert_eq!(c.legacy.table, "old_chunks");
        assert!(!c.legacy.applies_to("voidstone_ore"));

        let c = EngineConfig::from_toml_str("database_file = \"x.db\"\n").unwrap();
        assert!(c.legacy.applies_to("voidstone_ore"));
    }

    #[test]
    fn disabled_legacy_survives_round_trip() {
        let c = EngineConfig {
            legacy: LegacyConfig::disabled(),
            ..EngineConfig::default()
        };
        let text = toml::to_string(&c).unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), c);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        for text in [
            "databse_file = \"x.db\"\n",
            "[legacy]\ntabel = \"old_chunks\"\n",
            "[ores.test_ore]\nappearance = \"stone\"\ncolour = \"red\"\n[ores.test_ore.rules]\n",
        ] {
            assert!(
                matches!(EngineConfig::from_toml_str(text), Err(EngineError::Config(_))),
                "accepted {text:?}"
            );
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let c = EngineConfig::load(&dir.path().join("oregen.toml")).unwrap();
        assert_eq!(c, EngineConfig::default());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oregen.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        let c = EngineConfig::load(&path).unwrap();
        assert_eq!(c.ores.len(), 1);
    }
}
