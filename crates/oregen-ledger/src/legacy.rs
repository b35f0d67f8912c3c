//! The grandfathered ore type and its pre-unification table.
//!
//! Worlds generated before the unified ledger existed recorded one ore type
//! in a table of its own, keyed by `(world, chunk_x, chunk_z)` with no
//! `ore_type` column. Those rows are honoured in place; nothing is migrated.

use oregen_types::OreTypeId;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// Ore type whose history lives in the legacy table by default.
pub const DEFAULT_LEGACY_ORE: &str = "voidstone_ore";

/// Default name of the legacy table.
pub const DEFAULT_LEGACY_TABLE: &str = "voidstone_ore_chunks";

/// Which ore type, if any, is backed by a legacy table, and its name.
///
/// When the config has no legacy section at all, [`Default`] applies and
/// the rule covers [`DEFAULT_LEGACY_ORE`]. A section that omits `ore_type`
/// disables the rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LegacyConfig {
    /// `None` disables the legacy rule entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ore_type: Option<OreTypeId>,
    pub table: String,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            ore_type: OreTypeId::new(DEFAULT_LEGACY_ORE).ok(),
            table: DEFAULT_LEGACY_TABLE.to_string(),
        }
    }
}

impl LegacyConfig {
    /// No ore type is grandfathered.
    pub fn disabled() -> Self {
        Self {
            ore_type: None,
            table: DEFAULT_LEGACY_TABLE.to_string(),
        }
    }

    /// Returns `true` if `ore_type` is the grandfathered ore.
    pub fn applies_to(&self, ore_type: &str) -> bool {
        self.ore_type
            .as_ref()
            .is_some_and(|legacy| legacy.as_str() == ore_type)
    }

    /// The table name is interpolated into SQL, so it must be a plain
    /// identifier: ASCII letters, digits and `_`, not starting with a digit.
    pub fn validate(&self) -> LedgerResult<()> {
        let valid = !self.table.is_empty()
            && !self.table.starts_with(|c: char| c.is_ascii_digit())
            && self
                .table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid {
            Ok(())
        } else {
            Err(LedgerError::InvalidTableName(self.table.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_targets_voidstone() {
        let legacy = LegacyConfig::default();
        assert!(legacy.applies_to("voidstone_ore"));
        assert!(!legacy.applies_to("test_ore"));
        assert!(legacy.validate().is_ok());
    }

    #[test]
    fn disabled_applies_to_nothing() {
        assert!(!LegacyConfig::disabled().applies_to("voidstone_ore"));
    }

    #[test]
    fn table_names_must_be_identifiers() {
        for bad in ["", "1chunks", "chunks; DROP TABLE x", "ore-chunks"] {
            let legacy = LegacyConfig {
                table: bad.to_string(),
                ..LegacyConfig::default()
            };
            assert!(matches!(
                legacy.validate(),
                Err(LedgerError::InvalidTableName(_))
            ));
        }
    }
}
