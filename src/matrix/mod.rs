pub mod builder;
pub mod canonical;
pub mod consolidator;
pub mod csv_io;
pub mod raw;

pub use builder::{build_raw_matrix, load_recipe_list, BuildStats, ScrapedRecipe};
pub use canonical::{CanonicalMatrix, RecipeRow};
pub use consolidator::{
    consolidate, drop_duplicate_rows, plan_columns, ColumnPlan, Consolidation, ConsolidationReport,
    DuplicateTitlePolicy, IngredientFrequency, UNMAPPED_PREFIX,
};
pub use raw::RawMatrix;

use crate::error::{PipelineError, Result};
use std::collections::HashSet;

pub(crate) fn ensure_unique_columns(columns: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(columns.len());
    for column in columns {
        if !seen.insert(column.as_str()) {
            return Err(PipelineError::DuplicateColumn(column.clone()));
        }
    }
    Ok(())
}
