use std::io;

/// Errors raised by the taxonomy, matrix and scoring stages.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("Malformed taxonomy: {0}")]
    MalformedTaxonomy(String),

    #[error("Standardized ingredient '{name}' appears under both '{first}' and '{second}'")]
    DuplicateStandardName {
        name: String,
        first: String,
        second: String,
    },

    #[error("Invalid weight configuration: {0}")]
    InvalidWeight(String),

    #[error("Missing header row")]
    MissingHeader,

    #[error("Duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("Row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid cell at row {row}, column '{column}': '{value}' (expected 0 or 1)")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Recipe title '{0}' matches more than one matrix row")]
    AmbiguousRowKey(String),

    #[error("Unknown recipe '{0}'")]
    UnknownRecipe(String),

    #[error("Number of recipes to return must be at least 1")]
    InvalidRecipeCount,
}

pub type Result<T> = std::result::Result<T, PipelineError>;
