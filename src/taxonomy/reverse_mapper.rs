use super::Taxonomy;
use std::collections::HashMap;
use tracing::warn;

/// Where a raw alias ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingResult {
    Mapped {
        category: String,
        standardized_name: String,
    },
    Removed,
}

/// Result of looking up a (normalized) column label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Mapped {
        category: &'a str,
        standardized_name: &'a str,
    },
    Removed,
    Unmapped,
}

#[derive(Debug, Clone, Default)]
pub struct ReverseMapping {
    table: HashMap<String, MappingResult>,
}

/// Canonical matching form of a label: trimmed and lowercased.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Builds the alias lookup. Categories register in document order and the
/// removal list registers last, so an alias listed twice resolves to its
/// last registration. Keeping aliases unique is up to the taxonomy author.
pub fn build_reverse_mapping(taxonomy: &Taxonomy) -> ReverseMapping {
    let mut table = HashMap::new();

    for (category, names) in taxonomy.categories() {
        for (standardized_name, aliases) in names {
            for alias in aliases {
                let entry = MappingResult::Mapped {
                    category: category.to_string(),
                    standardized_name: standardized_name.clone(),
                };
                if let Some(previous) = table.insert(alias.clone(), entry) {
                    warn!(alias = %alias, ?previous, category, standardized_name = %standardized_name, "Alias registered twice, last entry wins");
                }
            }
        }
    }

    for alias in taxonomy.removed() {
        if let Some(previous) = table.insert(alias.clone(), MappingResult::Removed) {
            warn!(alias = %alias, ?previous, "Alias is also on the removal list, removing it");
        }
    }

    ReverseMapping { table }
}

impl ReverseMapping {
    /// Exact lookup; callers normalize first.
    pub fn get(&self, alias: &str) -> Option<&MappingResult> {
        self.table.get(alias)
    }

    /// Normalizes `label` and classifies it.
    pub fn classify(&self, label: &str) -> Lookup<'_> {
        match self.table.get(&normalize_label(label)) {
            Some(MappingResult::Mapped {
                category,
                standardized_name,
            }) => Lookup::Mapped {
                category,
                standardized_name,
            },
            Some(MappingResult::Removed) => Lookup::Removed,
            None => Lookup::Unmapped,
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
