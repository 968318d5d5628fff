use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Recommend recipes from the ingredients you have", long_about = None)]
pub struct Cli {
    /// Taxonomy JSON (defaults to $RECIPE_TAXONOMY_PATH or data/taxonomy.json)
    #[arg(long, global = true)]
    pub taxonomy: Option<PathBuf>,

    /// Weight configuration JSON (defaults to $RECIPE_WEIGHTS_PATH or data/weights.json)
    #[arg(long, global = true)]
    pub weights: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a raw recipe x ingredient matrix from scraped recipes
    BuildMatrix {
        /// CSV with `recipe_title` and `ingredients` columns
        #[arg(short, long)]
        recipes: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Map raw ingredient columns onto the taxonomy and deduplicate recipes
    Consolidate {
        /// Raw matrix CSV
        #[arg(short, long)]
        input: PathBuf,
        /// Canonical matrix CSV to write
        #[arg(short, long)]
        output: PathBuf,
        /// Also write the cleaning report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
        /// Also write a binary snapshot of the canonical matrix
        #[arg(long)]
        snapshot: Option<PathBuf>,
        /// Rename colliding recipe titles instead of failing
        #[arg(long)]
        disambiguate_titles: bool,
    },
    /// Rank recipes against the available ingredients
    Recommend {
        /// Available ingredient (standardized name); repeatable
        #[arg(short, long = "ingredient", required = true)]
        ingredients: Vec<String>,
        #[arg(short = 'n', long, default_value_t = 10)]
        num_recipes: usize,
        /// Canonical matrix CSV (defaults to $RECIPE_MATRIX_PATH)
        #[arg(short, long)]
        matrix: Option<PathBuf>,
        /// Load the matrix from a binary snapshot instead of CSV
        #[arg(long, conflicts_with = "matrix")]
        snapshot: Option<PathBuf>,
        /// Apply per-ingredient weight overrides
        #[arg(long)]
        overrides: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the derived ingredient weight table
    Weights {
        #[arg(long)]
        overrides: bool,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
