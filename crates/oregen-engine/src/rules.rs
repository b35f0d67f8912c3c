use std::collections::BTreeMap;
use std::sync::Arc;

use oregen_scan::CustomBlock;
use oregen_types::{GenerationRules, Material, OreTypeId};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};

/// What the manager needs to generate one ore type.
#[derive(Clone, Debug, PartialEq)]
pub struct OreRule {
    pub block: CustomBlock,
    pub rules: GenerationRules,
}

/// Rules for every configured ore type, keyed by identifier.
///
/// Populated once at startup and read-only afterwards, so lookups need no
/// synchronisation. Entries are reference-counted so a caller can hold one
/// across a scan without borrowing the registry.
#[derive(Clone, Debug, Default)]
pub struct RuleRegistry {
    rules: BTreeMap<OreTypeId, Arc<OreRule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the `[ores.*]` sections of a config.
    pub fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        let mut registry = Self::new();
        for (name, ore) in &config.ores {
            let id = OreTypeId::new(name.as_str())?;
            registry.insert(id, ore.appearance.clone(), ore.rules.clone())?;
        }
        Ok(registry)
    }

    /// Register an ore type. Each identifier may be registered once.
    pub fn insert(
        &mut self,
        ore_type: OreTypeId,
        appearance: impl Into<Material>,
        rules: GenerationRules,
    ) -> EngineResult<()> {
        if self.rules.contains_key(&ore_type) {
            return Err(EngineError::DuplicateOre(ore_type.to_string()));
        }
        let block = CustomBlock::new(ore_type.clone(), appearance);
        self.rules.insert(ore_type, Arc::new(OreRule { block, rules }));
        Ok(())
    }

    pub fn get(&self, ore_type: &OreTypeId) -> Option<Arc<OreRule>> {
        self.rules.get(ore_type).cloned()
    }

    pub fn ore_types(&self) -> impl Iterator<Item = &OreTypeId> {
        self.rules.keys()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
