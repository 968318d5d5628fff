pub mod engine;
pub mod recommender;
pub mod weights;

pub use engine::{normalize_available, score, ResolvedQuery};
pub use recommender::{recommend, ScoredRecipe, PARALLEL_THRESHOLD};
pub use weights::{build_weight_table, WeightConfig, WeightTable, DEFAULT_WEIGHT};
