//! Ingredient importance weights derived from taxonomy categories.
//!
//! - Every standardized ingredient of a weighted category gets the
//!   category's weight.
//! - Optional per-ingredient overrides are layered on top and always win.
//! - Anything left out falls back to `DEFAULT_WEIGHT` at lookup time.

use crate::error::{PipelineError, Result};
use crate::taxonomy::Taxonomy;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_WEIGHT: u32 = 2;
pub const WEIGHT_RANGE: std::ops::RangeInclusive<u32> = 1..=5;

fn default_weight() -> u32 {
    DEFAULT_WEIGHT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightConfig {
    #[serde(default)]
    pub category_weights: IndexMap<String, u32>,
    #[serde(default)]
    pub overrides: IndexMap<String, u32>,
    #[serde(default)]
    pub overrides_enabled: bool,
    #[serde(default = "default_weight")]
    pub default_weight: u32,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl WeightConfig {
    /// Built-in category table, with salt/pepper/oil overrides available but off.
    pub fn default_seed() -> Self {
        let category_weights = [
            ("meat", 5),
            ("fish_seafood", 5),
            ("vegetables", 4),
            ("grains_legumes", 4),
            ("fruits_nuts", 3),
            ("dairy_eggs", 3),
            ("sweets_baking", 3),
            ("spices", 2),
            ("liquids", 2),
            ("cooking_bases", 2),
            ("processed_foods", 2),
            ("condiments", 1),
        ]
        .into_iter()
        .map(|(c, w)| (c.to_string(), w))
        .collect();
        let overrides = [("salt", 1), ("pepper", 1), ("oil", 2)]
            .into_iter()
            .map(|(n, w)| (n.to_string(), w))
            .collect();

        Self {
            category_weights,
            overrides,
            overrides_enabled: false,
            default_weight: DEFAULT_WEIGHT,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_overrides(mut self, enabled: bool) -> Self {
        self.overrides_enabled = enabled;
        self
    }

    /// Every weight lies in `1..=5`; the fallback is always `DEFAULT_WEIGHT`.
    pub fn validate(&self) -> Result<()> {
        if self.default_weight != DEFAULT_WEIGHT {
            return Err(PipelineError::InvalidWeight(format!(
                "default_weight must be {}, found {}",
                DEFAULT_WEIGHT, self.default_weight
            )));
        }
        let out_of_range = self
            .category_weights
            .iter()
            .chain(&self.overrides)
            .find(|(_, w)| !WEIGHT_RANGE.contains(*w));
        if let Some((name, weight)) = out_of_range {
            return Err(PipelineError::InvalidWeight(format!(
                "weight for '{}' must be within {}..={}, found {}",
                name,
                WEIGHT_RANGE.start(),
                WEIGHT_RANGE.end(),
                weight
            )));
        }
        Ok(())
    }
}

/// Standardized ingredient -> weight. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeightTable {
    weights: HashMap<String, u32>,
    default_weight: u32,
}

pub fn build_weight_table(taxonomy: &Taxonomy, config: &WeightConfig) -> WeightTable {
    let mut weights = HashMap::new();

    for (category, &weight) in &config.category_weights {
        if let Some(names) = taxonomy.category(category) {
            for name in names.keys() {
                weights.insert(name.clone(), weight);
            }
        }
    }

    if config.overrides_enabled {
        for (name, &weight) in &config.overrides {
            weights.insert(name.clone(), weight);
        }
    }

    WeightTable {
        weights,
        default_weight: DEFAULT_WEIGHT,
    }
}

impl WeightTable {
    pub fn from_map(weights: HashMap<String, u32>, default_weight: u32) -> Self {
        Self {
            weights,
            default_weight,
        }
    }

    pub fn get(&self, ingredient: &str) -> Option<u32> {
        self.weights.get(ingredient).copied()
    }

    /// Weight used when scoring; unknown ingredients get the default.
    pub fn weight_for(&self, ingredient: &str) -> u32 {
        self.get(ingredient).unwrap_or(self.default_weight)
    }

    pub fn default_weight(&self) -> u32 {
        self.default_weight
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Entries sorted by weight (descending) then name.
    pub fn sorted(&self) -> Vec<(&str, u32)> {
        let mut entries: Vec<(&str, u32)> = self
            .weights
            .iter()
            .map(|(name, &weight)| (name.as_str(), weight))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries
    }
}
