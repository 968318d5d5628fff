use crate::error::{PipelineError, Result};
use crate::matrix::{consolidate, CanonicalMatrix, ConsolidationReport, DuplicateTitlePolicy, RawMatrix};
use crate::scoring::{build_weight_table, normalize_available, recommend, ResolvedQuery, ScoredRecipe, WeightConfig, WeightTable};
use crate::taxonomy::{build_reverse_mapping, ReverseMapping, Taxonomy};
use std::sync::Arc;
use tracing::info;

/// Everything a recommendation session reads: the taxonomy, the tables
/// derived from it, and the canonical matrix. Nothing here is mutated after
/// construction; reloading produces a new context.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    taxonomy: Arc<Taxonomy>,
    reverse_mapping: Arc<ReverseMapping>,
    weights: Arc<WeightTable>,
    matrix: Arc<CanonicalMatrix>,
}

impl PipelineContext {
    /// Consolidates `raw` and derives every table from `taxonomy`.
    pub fn build(
        taxonomy: Taxonomy,
        weight_config: &WeightConfig,
        raw: &RawMatrix,
        policy: DuplicateTitlePolicy,
    ) -> Result<(Self, ConsolidationReport)> {
        let reverse_mapping = build_reverse_mapping(&taxonomy);
        let weights = build_weight_table(&taxonomy, weight_config);
        let consolidation = consolidate(raw, &reverse_mapping, policy)?;
        info!(
            recipes = consolidation.matrix.len(),
            ingredients = consolidation.matrix.columns().len(),
            "Pipeline context built from raw matrix"
        );

        let context = Self {
            taxonomy: Arc::new(taxonomy),
            reverse_mapping: Arc::new(reverse_mapping),
            weights: Arc::new(weights),
            matrix: Arc::new(consolidation.matrix),
        };
        Ok((context, consolidation.report))
    }

    /// Uses an already consolidated matrix, e.g. one reloaded from CSV.
    pub fn from_canonical(taxonomy: Taxonomy, weight_config: &WeightConfig, matrix: CanonicalMatrix) -> Self {
        let reverse_mapping = build_reverse_mapping(&taxonomy);
        let weights = build_weight_table(&taxonomy, weight_config);
        Self {
            taxonomy: Arc::new(taxonomy),
            reverse_mapping: Arc::new(reverse_mapping),
            weights: Arc::new(weights),
            matrix: Arc::new(matrix),
        }
    }

    /// New context sharing taxonomy and weights but serving `matrix`.
    pub fn with_matrix(&self, matrix: CanonicalMatrix) -> Self {
        Self {
            matrix: Arc::new(matrix),
            ..self.clone()
        }
    }

    /// New context with weights rebuilt from `weight_config`.
    pub fn with_weights(&self, weight_config: &WeightConfig) -> Self {
        Self {
            weights: Arc::new(build_weight_table(&self.taxonomy, weight_config)),
            ..self.clone()
        }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn reverse_mapping(&self) -> &ReverseMapping {
        &self.reverse_mapping
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    pub fn matrix(&self) -> &CanonicalMatrix {
        &self.matrix
    }

    /// Top `num_recipes` recipes for the given ingredient names. Names are
    /// trimmed, then matched verbatim or in lowercase against the columns.
    pub fn recommend<I, S>(&self, available: I, num_recipes: usize) -> Result<Vec<ScoredRecipe>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let available = normalize_available(available);
        recommend(&available, &self.matrix, &self.weights, num_recipes)
    }

    pub fn score_recipe<I, S>(&self, title: &str, available: I) -> Result<u64>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let recipe = self
            .matrix
            .recipe(title)
            .ok_or_else(|| PipelineError::UnknownRecipe(title.to_string()))?;
        let available = normalize_available(available);
        Ok(ResolvedQuery::new(&available, &self.matrix, &self.weights).score(recipe))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxonomy() -> Taxonomy {
        Taxonomy::from_json_str(
            r#"{
                "meat": { "poultry": ["poulet", "canard"] },
                "vegetables": { "tomato": ["tomate", "tomates"] },
                "condiments": { "salt": ["sel"] },
                "remove": ["colorant"]
            }"#,
        )
        .unwrap()
    }

    fn raw() -> RawMatrix {
        RawMatrix::from_reader(
            ",poulet,canard,tomate,tomates,sel,colorant\n\
             A,1,0,1,0,0,1\n\
             B,0,0,0,1,1,0\n"
                .as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn test_build_and_recommend() -> anyhow::Result<()> {
        let (context, report) = PipelineContext::build(
            taxonomy(),
            &WeightConfig::default_seed(),
            &raw(),
            DuplicateTitlePolicy::Reject,
        )?;
        assert_eq!(report.removed_columns, vec!["colorant"]);
        assert_eq!(context.matrix().columns(), &["poultry", "tomato", "salt"]);

        let ranked = context.recommend(["Poultry", "tomato ", "salt"], 2)?;
        assert_eq!(
            ranked,
            vec![
                ScoredRecipe { title: "A".into(), score: 9 },
                ScoredRecipe { title: "B".into(), score: 5 },
            ]
        );
        Ok(())
    }

    #[test]
    fn test_score_unknown_recipe() -> anyhow::Result<()> {
        let (context, _) = PipelineContext::build(
            taxonomy(),
            &WeightConfig::default_seed(),
            &raw(),
            DuplicateTitlePolicy::Reject,
        )?;
        assert_eq!(context.score_recipe("B", ["salt"])?, 1);
        assert!(matches!(
            context.score_recipe("Z", ["salt"]),
            Err(PipelineError::UnknownRecipe(t)) if t == "Z"
        ));
        Ok(())
    }

    #[test]
    fn test_mixed_case_unmapped_column_is_queryable() -> anyhow::Result<()> {
        let raw = RawMatrix::from_reader(",Safran,sel\nPaella,1,0\n".as_bytes())?;
        let (context, _) = PipelineContext::build(
            taxonomy(),
            &WeightConfig::default_seed(),
            &raw,
            DuplicateTitlePolicy::Reject,
        )?;
        assert_eq!(context.matrix().columns(), &["salt", "unmapped_Safran"]);

        let ranked = context.recommend(["unmapped_Safran"], 1)?;
        assert_eq!(ranked, vec![ScoredRecipe { title: "Paella".into(), score: 2 }]);
        assert_eq!(context.score_recipe("Paella", [" unmapped_Safran "])?, 2);
        Ok(())
    }

    #[test]
    fn test_rebuild_leaves_old_context_untouched() -> anyhow::Result<()> {
        let (context, _) = PipelineContext::build(
            taxonomy(),
            &WeightConfig::default_seed(),
            &raw(),
            DuplicateTitlePolicy::Reject,
        )?;
        let replacement = CanonicalMatrix::new(vec!["C".into()], vec!["salt".into()], vec![vec![true]])?;
        let reloaded = context.with_matrix(replacement);

        assert_eq!(context.matrix().titles(), &["A", "B"]);
        assert_eq!(reloaded.matrix().titles(), &["C"]);

        let mut config = WeightConfig::default_seed();
        config.category_weights.insert("condiments".into(), 3);
        let reweighted = context.with_weights(&config);
        assert_eq!(context.weights().get("salt"), Some(1));
        assert_eq!(reweighted.weights().get("salt"), Some(3));
        Ok(())
    }
}
