use super::engine::ResolvedQuery;
use super::weights::WeightTable;
use crate::error::{PipelineError, Result};
use crate::matrix::CanonicalMatrix;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Matrices with more recipes than this are scored across the rayon pool.
pub const PARALLEL_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredRecipe {
    pub title: String,
    pub score: u64,
}

/// Ranks every recipe by score, highest first, and keeps the first
/// `num_recipes`. Equal scores keep matrix row order.
pub fn recommend(
    available: &HashSet<String>,
    matrix: &CanonicalMatrix,
    weights: &WeightTable,
    num_recipes: usize,
) -> Result<Vec<ScoredRecipe>> {
    if num_recipes == 0 {
        return Err(PipelineError::InvalidRecipeCount);
    }

    let query = ResolvedQuery::new(available, matrix, weights);
    let scores: Vec<u64> = if matrix.len() > PARALLEL_THRESHOLD {
        (0..matrix.len())
            .into_par_iter()
            .map(|index| matrix.row(index).map_or(0, |row| query.score(row)))
            .collect()
    } else {
        matrix.recipes().map(|row| query.score(row)).collect()
    };

    let mut ranked: Vec<(usize, u64)> = scores.into_iter().enumerate().collect();
    // stable: ties stay in row order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(num_recipes);

    debug!(
        recipes = matrix.len(),
        returned = ranked.len(),
        best = ?ranked.first().map(|&(_, s)| s),
        "Ranked recipes"
    );

    Ok(ranked
        .into_iter()
        .map(|(index, score)| ScoredRecipe {
            title: matrix.titles()[index].clone(),
            score,
        })
        .collect())
}
