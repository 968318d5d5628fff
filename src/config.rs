use std::env;
use std::path::PathBuf;

pub const TAXONOMY_PATH_ENV_VAR: &str = "RECIPE_TAXONOMY_PATH";
pub const WEIGHTS_PATH_ENV_VAR: &str = "RECIPE_WEIGHTS_PATH";
pub const MATRIX_PATH_ENV_VAR: &str = "RECIPE_MATRIX_PATH";

const DEFAULT_TAXONOMY_PATH: &str = "data/taxonomy.json";
const DEFAULT_WEIGHTS_PATH: &str = "data/weights.json";
const DEFAULT_MATRIX_PATH: &str = "data/recipe_ingredient_matrix_cleaned.csv";

/// File locations for the pipeline inputs. CLI flags take precedence over
/// these environment-derived defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub taxonomy_path: PathBuf,
    pub weights_path: PathBuf,
    pub matrix_path: PathBuf,
}

impl PipelineConfig {
    /// Reads `.env` (if any) then the environment.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };
        Self {
            taxonomy_path: path(TAXONOMY_PATH_ENV_VAR, DEFAULT_TAXONOMY_PATH),
            weights_path: path(WEIGHTS_PATH_ENV_VAR, DEFAULT_WEIGHTS_PATH),
            matrix_path: path(MATRIX_PATH_ENV_VAR, DEFAULT_MATRIX_PATH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let config = PipelineConfig::from_lookup(|_| None);
        assert_eq!(config.taxonomy_path, PathBuf::from("data/taxonomy.json"));
        assert_eq!(config.weights_path, PathBuf::from("data/weights.json"));
    }

    #[test]
    fn test_environment_overrides() {
        let vars: HashMap<&str, &str> = [
            (MATRIX_PATH_ENV_VAR, "/tmp/matrix.csv"),
            (WEIGHTS_PATH_ENV_VAR, "  "),
        ]
        .into_iter()
        .collect();
        let config = PipelineConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.matrix_path, PathBuf::from("/tmp/matrix.csv"));
        assert_eq!(config.weights_path, PathBuf::from("data/weights.json"));
    }
}
