//! Static ingredient taxonomy: category -> standardized name -> raw aliases,
//! plus the list of aliases that are noise and must be dropped.

pub mod reverse_mapper;

use crate::error::{PipelineError, Result};
use indexmap::IndexMap;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

pub use reverse_mapper::{build_reverse_mapping, normalize_label, Lookup, MappingResult, ReverseMapping};

/// Key of the special entry holding aliases to discard.
pub const REMOVE_CATEGORY: &str = "remove";

pub type StandardizedIngredients = IndexMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Taxonomy {
    categories: IndexMap<String, StandardizedIngredients>,
    removed: Vec<String>,
}

impl Taxonomy {
    /// Builds a taxonomy, rejecting a standardized name listed under two categories.
    pub fn new(
        categories: IndexMap<String, StandardizedIngredients>,
        removed: Vec<String>,
    ) -> Result<Self> {
        let mut owners: IndexMap<&str, &str> = IndexMap::new();
        for (category, names) in &categories {
            if category == REMOVE_CATEGORY {
                return Err(PipelineError::MalformedTaxonomy(format!(
                    "'{}' is reserved for the removal list",
                    REMOVE_CATEGORY
                )));
            }
            for name in names.keys() {
                if let Some(first) = owners.insert(name.as_str(), category.as_str()) {
                    return Err(PipelineError::DuplicateStandardName {
                        name: name.clone(),
                        first: first.to_string(),
                        second: category.clone(),
                    });
                }
            }
        }
        let taxonomy = Self { categories, removed };
        for alias in taxonomy.unnormalized_aliases() {
            warn!(alias = %alias, "Alias is not trimmed lowercase and can never match a column");
        }
        Ok(taxonomy)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let taxonomy = Self::from_json_str(&contents)?;
        debug!(
            path = %path.display(),
            categories = taxonomy.categories.len(),
            removed = taxonomy.removed.len(),
            "Loaded taxonomy"
        );
        Ok(taxonomy)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Parses the nested `category -> {name -> [alias]}` document. The
    /// `remove` entry may hold strings or nested lists of strings; any
    /// other shape is fatal.
    pub fn from_value(value: &Value) -> Result<Self> {
        let root = value
            .as_object()
            .ok_or_else(|| malformed("top level must be an object"))?;

        let mut categories = IndexMap::new();
        let mut removed = Vec::new();

        for (category, body) in root {
            if category == REMOVE_CATEGORY {
                flatten_removal_list(body, &mut removed)?;
                continue;
            }

            let names = body.as_object().ok_or_else(|| {
                malformed(format!("category '{}' must map names to alias lists", category))
            })?;
            let mut standardized = IndexMap::with_capacity(names.len());
            for (name, aliases) in names {
                let aliases = aliases.as_array().ok_or_else(|| {
                    malformed(format!("aliases of '{}/{}' must be a list", category, name))
                })?;
                let aliases = aliases
                    .iter()
                    .map(|alias| {
                        alias.as_str().map(str::to_string).ok_or_else(|| {
                            malformed(format!("alias under '{}/{}' is not a string: {}", category, name, alias))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                standardized.insert(name.clone(), aliases);
            }
            categories.insert(category.clone(), standardized);
        }

        Self::new(categories, removed)
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &StandardizedIngredients)> {
        self.categories.iter().map(|(c, names)| (c.as_str(), names))
    }

    pub fn category(&self, category: &str) -> Option<&StandardizedIngredients> {
        self.categories.get(category)
    }

    pub fn removed(&self) -> &[String] {
        &self.removed
    }

    pub fn category_of(&self, standardized_name: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|(_, names)| names.contains_key(standardized_name))
            .map(|(category, _)| category.as_str())
    }

    pub fn standardized_names(&self) -> impl Iterator<Item = &str> {
        self.categories
            .values()
            .flat_map(|names| names.keys().map(String::as_str))
    }

    /// Aliases that differ from their lookup form. Column labels are
    /// normalized before lookup, so these are unreachable.
    pub fn unnormalized_aliases(&self) -> Vec<&str> {
        self.categories
            .values()
            .flat_map(|names| names.values().flatten())
            .chain(&self.removed)
            .filter(|alias| normalize_label(alias) != **alias)
            .map(String::as_str)
            .collect()
    }
}

fn flatten_removal_list(value: &Value, out: &mut Vec<String>) -> Result<()> {
    match value {
        Value::String(alias) => {
            out.push(alias.clone());
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(|item| flatten_removal_list(item, out)),
        other => Err(malformed(format!(
            "removal list entries must be strings or lists, found {}",
            other
        ))),
    }
}

fn malformed(message: impl Into<String>) -> PipelineError {
    PipelineError::MalformedTaxonomy(message.into())
}
