use super::canonical::CanonicalMatrix;
use super::raw::RawMatrix;
use crate::error::{PipelineError, Result};
use crate::taxonomy::{Lookup, ReverseMapping};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use tracing::{debug, info};

/// Prefix marking columns kept from labels the taxonomy does not know.
pub const UNMAPPED_PREFIX: &str = "unmapped_";

/// What to do with distinct rows that still share a recipe title once
/// duplicates are gone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicateTitlePolicy {
    #[default]
    Reject,
    /// Rename later rows to "<title> (2)", "<title> (3)", ...
    Disambiguate,
}

/// Partition of raw column indices. Every raw column lands in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnPlan {
    pub removed: Vec<usize>,
    /// standardized name -> source columns, in first-seen order
    pub groups: IndexMap<String, Vec<usize>>,
    pub unmapped: Vec<usize>,
}

pub fn plan_columns(columns: &[String], mapping: &ReverseMapping) -> ColumnPlan {
    let mut plan = ColumnPlan::default();
    for (index, column) in columns.iter().enumerate() {
        match mapping.classify(column) {
            Lookup::Removed => plan.removed.push(index),
            Lookup::Mapped {
                standardized_name, ..
            } => plan
                .groups
                .entry(standardized_name.to_string())
                .or_default()
                .push(index),
            Lookup::Unmapped => plan.unmapped.push(index),
        }
    }
    plan
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IngredientFrequency {
    pub name: String,
    pub recipes: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ConsolidationReport {
    pub input_recipes: usize,
    pub input_columns: usize,
    pub output_recipes: usize,
    pub output_columns: usize,
    pub removed_columns: Vec<String>,
    pub consolidated: IndexMap<String, Vec<String>>,
    pub unmapped_columns: Vec<String>,
    pub duplicate_rows_dropped: usize,
    pub titles_disambiguated: usize,
}

#[derive(Debug, Clone)]
pub struct Consolidation {
    pub matrix: CanonicalMatrix,
    pub report: ConsolidationReport,
}

/// Rewrites a raw matrix onto standardized columns.
///
/// Removed aliases are dropped, aliases of one standardized ingredient are
/// OR-ed into a single column, unknown labels survive as `unmapped_<label>`.
/// Identical rows are then collapsed (first occurrence wins) and remaining
/// title collisions are handled per `policy`.
pub fn consolidate(
    raw: &RawMatrix,
    mapping: &ReverseMapping,
    policy: DuplicateTitlePolicy,
) -> Result<Consolidation> {
    let plan = plan_columns(raw.columns(), mapping);
    let label = |index: &usize| raw.columns()[*index].clone();

    info!(
        removed = plan.removed.len(),
        groups = plan.groups.len(),
        unmapped = plan.unmapped.len(),
        "Partitioned raw ingredient columns"
    );

    let mut columns = Vec::with_capacity(plan.groups.len() + plan.unmapped.len());
    let mut sources: Vec<&[usize]> = Vec::with_capacity(columns.capacity());
    for (standardized_name, members) in &plan.groups {
        if members.len() > 1 {
            debug!(standardized_name = %standardized_name, sources = ?members.iter().map(label).collect::<Vec<_>>(), "Merging columns");
        }
        columns.push(standardized_name.clone());
        sources.push(members.as_slice());
    }
    for index in &plan.unmapped {
        columns.push(format!("{}{}", UNMAPPED_PREFIX, raw.columns()[*index]));
        sources.push(std::slice::from_ref(index));
    }

    let rows: Vec<Vec<bool>> = raw
        .rows()
        .iter()
        .map(|row| {
            sources
                .iter()
                .map(|members| members.iter().any(|&c| row[c]))
                .collect()
        })
        .collect();

    let (titles, rows, duplicate_rows_dropped) = drop_duplicate_rows(raw.titles().to_vec(), rows);
    if duplicate_rows_dropped > 0 {
        info!(dropped = duplicate_rows_dropped, "Removed duplicate recipes");
    }

    let (titles, titles_disambiguated) = resolve_title_collisions(titles, policy)?;

    let matrix = CanonicalMatrix::new(titles, columns, rows)?;
    let report = ConsolidationReport {
        input_recipes: raw.len(),
        input_columns: raw.columns().len(),
        output_recipes: matrix.len(),
        output_columns: matrix.columns().len(),
        removed_columns: plan.removed.iter().map(label).collect(),
        consolidated: plan
            .groups
            .iter()
            .map(|(name, members)| (name.clone(), members.iter().map(label).collect::<Vec<_>>()))
            .collect(),
        unmapped_columns: plan.unmapped.iter().map(label).collect(),
        duplicate_rows_dropped,
        titles_disambiguated,
    };

    Ok(Consolidation { matrix, report })
}

/// Keeps the first of every group of identical rows. Titles play no part in
/// the comparison. Returns the kept titles and rows plus the drop count.
pub fn drop_duplicate_rows(
    titles: Vec<String>,
    rows: Vec<Vec<bool>>,
) -> (Vec<String>, Vec<Vec<bool>>, usize) {
    let total = rows.len();
    let mut seen: HashSet<Vec<bool>> = HashSet::with_capacity(total);
    let mut kept_titles = Vec::with_capacity(total);
    let mut kept_rows = Vec::with_capacity(total);

    for (title, row) in titles.into_iter().zip(rows) {
        if seen.contains(&row) {
            continue;
        }
        seen.insert(row.clone());
        kept_titles.push(title);
        kept_rows.push(row);
    }

    let dropped = total - kept_rows.len();
    (kept_titles, kept_rows, dropped)
}

fn resolve_title_collisions(
    titles: Vec<String>,
    policy: DuplicateTitlePolicy,
) -> Result<(Vec<String>, usize)> {
    let mut taken: HashSet<String> = HashSet::with_capacity(titles.len());
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    let mut renamed = 0;

    // Reserve every original title first so a generated name never shadows a real one.
    let originals: HashSet<String> = titles.iter().cloned().collect();

    let mut resolved = Vec::with_capacity(titles.len());
    for title in titles {
        if taken.insert(title.clone()) {
            occurrences.insert(title.clone(), 1);
            resolved.push(title);
            continue;
        }
        if policy == DuplicateTitlePolicy::Reject {
            return Err(PipelineError::AmbiguousRowKey(title));
        }

        let counter = occurrences.entry(title.clone()).or_insert(1);
        let candidate = loop {
            *counter += 1;
            let candidate = format!("{} ({})", title, counter);
            if !taken.contains(&candidate) && !originals.contains(&candidate) {
                break candidate;
            }
        };
        debug!(title = %title, renamed_to = %candidate, "Disambiguated recipe title");
        taken.insert(candidate.clone());
        resolved.push(candidate);
        renamed += 1;
    }

    Ok((resolved, renamed))
}

impl ConsolidationReport {
    /// Groups built from more than one raw column.
    pub fn merged_groups(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.consolidated
            .iter()
            .filter(|(_, sources)| sources.len() > 1)
            .map(|(name, sources)| (name.as_str(), sources.as_slice()))
    }

    /// The `n` columns present in the most recipes. Ties keep column order.
    pub fn top_ingredients(matrix: &CanonicalMatrix, n: usize) -> Vec<IngredientFrequency> {
        let total = matrix.len();
        let mut ranked: Vec<(usize, usize)> = matrix.column_counts().into_iter().enumerate().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
            .into_iter()
            .take(n)
            .map(|(column, recipes)| IngredientFrequency {
                name: matrix.columns()[column].clone(),
                recipes,
                percentage: if total == 0 {
                    0.0
                } else {
                    recipes as f64 * 100.0 / total as f64
                },
            })
            .collect()
    }

    pub fn render_text(&self, matrix: &CanonicalMatrix) -> String {
        const UNMAPPED_PREVIEW: usize = 20;

        let mut out = String::new();
        let _ = writeln!(out, "RECIPE MATRIX CLEANING REPORT");
        let _ = writeln!(out, "{}", "=".repeat(50));
        let _ = writeln!(out, "Original: {} recipes x {} ingredients", self.input_recipes, self.input_columns);
        let _ = writeln!(out, "Cleaned:  {} recipes x {} ingredients", self.output_recipes, self.output_columns);
        let _ = writeln!(out, "Duplicate recipes removed: {}", self.duplicate_rows_dropped);
        if self.titles_disambiguated > 0 {
            let _ = writeln!(out, "Recipe titles disambiguated: {}", self.titles_disambiguated);
        }

        let _ = writeln!(out, "\nREMOVED ({}):", self.removed_columns.len());
        for column in &self.removed_columns {
            let _ = writeln!(out, "  - {}", column);
        }

        let _ = writeln!(out, "\nCONSOLIDATED ({} groups):", self.consolidated.len());
        for (name, sources) in self.merged_groups() {
            let _ = writeln!(out, "  {} <- {}", name, sources.join(", "));
        }

        let _ = writeln!(out, "\nUNMAPPED ({}):", self.unmapped_columns.len());
        for column in self.unmapped_columns.iter().take(UNMAPPED_PREVIEW) {
            let _ = writeln!(out, "  - {}", column);
        }
        if self.unmapped_columns.len() > UNMAPPED_PREVIEW {
            let _ = writeln!(out, "  ... and {} more", self.unmapped_columns.len() - UNMAPPED_PREVIEW);
        }

        let _ = writeln!(out, "\nTOP 10 MOST COMMON INGREDIENTS:");
        for entry in Self::top_ingredients(matrix, 10) {
            let _ = writeln!(out, "  {}: {} recipes ({:.1}%)", entry.name, entry.recipes, entry.percentage);
        }
        out
    }
}
