//! Per-ore generation parameters.
//!
//! A [`GenerationRules`] value is built once per ore type at startup and is
//! shared read-only afterwards. The only way to obtain one is through a
//! validating constructor, so every instance satisfies:
//!
//! - `min_y <= max_y`
//! - `spawn_probability` and `secondary_probability` are within `[0, 1]`
//! - `min_quota <= max_quota`
//! - `cluster_size >= 1`
//! - `repair_threshold` is finite and non-negative
//!
//! An empty `target_materials` set is valid and matches nothing.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::RulesError;
use crate::material::Material;

/// Validated generation parameters for one ore type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RulesBuilder")]
pub struct GenerationRules {
    excluded_materials: BTreeSet<Material>,
    min_y: i32,
    max_y: i32,
    spawn_probability: f64,
    secondary_probability: f64,
    min_quota: u32,
    max_quota: u32,
    cluster_size: u32,
    repair_threshold: f64,
    target_materials: BTreeSet<Material>,
}

impl GenerationRules {
    /// Construct rules from every parameter at once.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        excluded_materials: impl IntoIterator<Item = Material>,
        min_y: i32,
        max_y: i32,
        spawn_probability: f64,
        secondary_probability: f64,
        min_quota: u32,
        max_quota: u32,
        cluster_size: u32,
        repair_threshold: f64,
        target_materials: impl IntoIterator<Item = Material>,
    ) -> Result<Self, RulesError> {
        RulesBuilder {
            excluded_materials: excluded_materials.into_iter().collect(),
            min_y,
            max_y,
            spawn_probability,
            secondary_probability,
            min_quota,
            max_quota,
            cluster_size,
            repair_threshold,
            target_materials: target_materials.into_iter().collect(),
        }
        .build()
    }

    /// Start from the defaults of [`RulesBuilder`].
    pub fn builder() -> RulesBuilder {
        RulesBuilder::default()
    }

    pub fn excluded_materials(&self) -> &BTreeSet<Material> {
        &self.excluded_materials
    }

    pub fn min_y(&self) -> i32 {
        self.min_y
    }

    pub fn max_y(&self) -> i32 {
        self.max_y
    }

    pub fn spawn_probability(&self) -> f64 {
        self.spawn_probability
    }

    pub fn secondary_probability(&self) -> f64 {
        self.secondary_probability
    }

    pub fn min_quota(&self) -> u32 {
        self.min_quota
    }

    pub fn max_quota(&self) -> u32 {
        self.max_quota
    }

    pub fn cluster_size(&self) -> u32 {
        self.cluster_size
    }

    pub fn repair_threshold(&self) -> f64 {
        self.repair_threshold
    }

    pub fn target_materials(&self) -> &BTreeSet<Material> {
        &self.target_materials
    }

    /// Returns `true` if `material` counts as a repair-scan match.
    pub fn is_target(&self, material: &Material) -> bool {
        self.target_materials.contains(material)
    }

    /// Returns `true` if generation must never replace `material`.
    pub fn is_excluded(&self, material: &Material) -> bool {
        self.excluded_materials.contains(material)
    }

    /// Number of target matches at which a chunk counts as already
    /// populated: `ceil(repair_threshold * min_quota)`, never below 1.
    pub fn populated_threshold(&self) -> u32 {
        let scaled = (self.repair_threshold * f64::from(self.min_quota)).ceil();
        (scaled.min(f64::from(u32::MAX)) as u32).max(1)
    }
}

/// Mutable staging area for [`GenerationRules`]; also the serde shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RulesBuilder {
    pub excluded_materials: BTreeSet<Material>,
    pub min_y: i32,
    pub max_y: i32,
    pub spawn_probability: f64,
    pub secondary_probability: f64,
    pub min_quota: u32,
    pub max_quota: u32,
    pub cluster_size: u32,
    pub repair_threshold: f64,
    pub target_materials: BTreeSet<Material>,
}

impl Default for RulesBuilder {
    fn default() -> Self {
        Self {
            excluded_materials: BTreeSet::new(),
            min_y: -64,
            max_y: 320,
            spawn_probability: 0.0,
            secondary_probability: 0.0,
            min_quota: 0,
            max_quota: 0,
            cluster_size: 1,
            repair_threshold: 0.0,
            target_materials: BTreeSet::new(),
        }
    }
}

impl RulesBuilder {
    pub fn height_range(mut self, min_y: i32, max_y: i32) -> Self {
        self.min_y = min_y;
        self.max_y = max_y;
        self
    }

    pub fn spawn_probability(mut self, p: f64) -> Self {
        self.spawn_probability = p;
        self
    }

    pub fn secondary_probability(mut self, p: f64) -> Self {
        self.secondary_probability = p;
        self
    }

    pub fn quota(mut self, min: u32, max: u32) -> Self {
        self.min_quota = min;
        self.max_quota = max;
        self
    }

    pub fn cluster_size(mut self, size: u32) -> Self {
        self.cluster_size = size;
        self
    }

    pub fn repair_threshold(mut self, threshold: f64) -> Self {
        self.repair_threshold = threshold;
        self
    }

    pub fn exclude(mut self, material: impl Into<Material>) -> Self {
        self.excluded_materials.insert(material.into());
        self
    }

    pub fn target(mut self, material: impl Into<Material>) -> Self {
        self.target_materials.insert(material.into());
        self
    }

    /// Validate and freeze the rules.
    pub fn build(self) -> Result<GenerationRules, RulesError> {
        if self.min_y > self.max_y {
            return Err(RulesError::InvertedHeightRange {
                min_y: self.min_y,
                max_y: self.max_y,
            });
        }
        check_probability("spawn_probability", self.spawn_probability)?;
        check_probability("secondary_probability", self.secondary_probability)?;
        if self.min_quota > self.max_quota {
            return Err(RulesError::InvertedQuota {
                min: self.min_quota,
                max: self.max_quota,
            });
        }
        if self.cluster_size == 0 {
            return Err(RulesError::EmptyCluster);
        }
        if !self.repair_threshold.is_finite() || self.repair_threshold < 0.0 {
            return Err(RulesError::InvalidRepairThreshold(self.repair_threshold));
        }

        Ok(GenerationRules {
            excluded_materials: self.excluded_materials,
            min_y: self.min_y,
            max_y: self.max_y,
            spawn_probability: self.spawn_probability,
            secondary_probability: self.secondary_probability,
            min_quota: self.min_quota,
            max_quota: self.max_quota,
            cluster_size: self.cluster_size,
            repair_threshold: self.repair_threshold,
            target_materials: self.target_materials,
        })
    }
}

impl TryFrom<RulesBuilder> for GenerationRules {
    type Error = RulesError;

    fn try_from(builder: RulesBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), RulesError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        // NaN fails `contains` as well.
        Err(RulesError::ProbabilityOutOfRange { field, value })
    }
}
