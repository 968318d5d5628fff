use super::weights::WeightTable;
use crate::matrix::{CanonicalMatrix, RecipeRow};
use crate::taxonomy::normalize_label;
use std::collections::HashSet;

/// Query ingredients resolved against one matrix: the column each one
/// occupies and the weight it earns when present. A name matches its column
/// verbatim first, then in trimmed lowercase form. Ingredients without a
/// column are left out since they can never score, and a column reached by
/// several spellings counts once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQuery {
    terms: Vec<(usize, u32)>,
}

impl ResolvedQuery {
    pub fn new(available: &HashSet<String>, matrix: &CanonicalMatrix, weights: &WeightTable) -> Self {
        let mut terms: Vec<(usize, u32)> = available
            .iter()
            .filter_map(|ingredient| resolve_column(ingredient, matrix))
            .map(|column| (column, weights.weight_for(&matrix.columns()[column])))
            .collect();
        terms.sort_unstable();
        terms.dedup_by_key(|(column, _)| *column);
        Self { terms }
    }

    pub fn score(&self, recipe: RecipeRow<'_>) -> u64 {
        self.terms
            .iter()
            .filter(|(column, _)| recipe.has(*column))
            .map(|&(_, weight)| u64::from(weight))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

fn resolve_column(ingredient: &str, matrix: &CanonicalMatrix) -> Option<usize> {
    matrix
        .column_index(ingredient)
        .or_else(|| matrix.column_index(&normalize_label(ingredient)))
}

/// Sum of the weights of the available ingredients this recipe contains.
pub fn score(
    available: &HashSet<String>,
    recipe: RecipeRow<'_>,
    matrix: &CanonicalMatrix,
    weights: &WeightTable,
) -> u64 {
    ResolvedQuery::new(available, matrix, weights).score(recipe)
}

/// Trims query names and drops blanks. Case is kept so `unmapped_` columns,
/// which carry the raw label's casing, stay reachable.
pub fn normalize_available<I, S>(ingredients: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ingredients
        .into_iter()
        .map(|name| name.as_ref().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::Rng;
    use std::collections::HashMap;

    fn weights() -> WeightTable {
        let map = [("poultry", 5), ("tomato", 4), ("salt", 1)]
            .into_iter()
            .map(|(n, w)| (n.to_string(), w))
            .collect::<HashMap<_, _>>();
        WeightTable::from_map(map, 2)
    }

    fn matrix() -> CanonicalMatrix {
        CanonicalMatrix::new(
            vec!["A".into(), "B".into()],
            vec!["poultry".into(), "tomato".into(), "salt".into(), "basil".into()],
            vec![vec![true, true, false, true], vec![false, true, true, false]],
        )
        .unwrap()
    }

    fn set(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_weighted_score() {
        let matrix = matrix();
        let available = set(&["poultry", "tomato", "salt"]);
        let a = matrix.recipe("A").unwrap();
        let b = matrix.recipe("B").unwrap();
        assert_eq!(score(&available, a, &matrix, &weights()), 9);
        assert_eq!(score(&available, b, &matrix, &weights()), 5);
    }

    #[test]
    fn test_unknown_ingredient_scores_zero() {
        let matrix = matrix();
        let available = set(&["truffle"]);
        let a = matrix.recipe("A").unwrap();
        assert_eq!(score(&available, a, &matrix, &weights()), 0);
        assert!(ResolvedQuery::new(&available, &matrix, &weights()).is_empty());
    }

    #[test]
    fn test_missing_weight_uses_default() {
        let matrix = matrix();
        let a = matrix.recipe("A").unwrap();
        assert_eq!(score(&set(&["basil"]), a, &matrix, &weights()), 2);
    }

    #[test]
    fn test_normalize_available() {
        let names = normalize_available(["  Tomato ", "SALT", "", " ", "salt"]);
        assert_eq!(names, set(&["Tomato", "SALT", "salt"]));
    }

    #[test]
    fn test_query_matches_exact_then_lowercase() -> anyhow::Result<()> {
        let matrix = CanonicalMatrix::new(
            vec!["Paella".into()],
            vec!["salt".into(), "unmapped_Safran".into()],
            vec![vec![true, true]],
        )?;
        let paella = matrix.recipe("Paella").unwrap();
        assert_eq!(score(&set(&["unmapped_Safran"]), paella, &matrix, &weights()), 2);
        assert_eq!(score(&set(&["SALT"]), paella, &matrix, &weights()), 1);
        // two spellings of one column count once
        assert_eq!(score(&set(&["Salt", "salt"]), paella, &matrix, &weights()), 1);
        assert_eq!(score(&set(&["unmapped_safran"]), paella, &matrix, &weights()), 0);
        Ok(())
    }

    #[test]
    fn test_adding_ingredients_never_lowers_score() {
        let matrix = matrix();
        let weights = weights();
        let pool = ["poultry", "tomato", "salt", "basil", "truffle"];
        let mut rng = rand::thread_rng();

        for _ in 0..100 {
            let mut shuffled = pool.to_vec();
            shuffled.shuffle(&mut rng);
            let cut = rng.gen_range(0..=pool.len());
            let smaller = set(&shuffled[..cut]);
            let larger = set(&shuffled);
            for recipe in matrix.recipes() {
                assert!(score(&smaller, recipe, &matrix, &weights) <= score(&larger, recipe, &matrix, &weights));
            }
        }
    }
}
