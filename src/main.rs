use anyhow::{Context, Result};
use recipe_recommender::cli::{parse_args, Cli, Command};
use recipe_recommender::config::PipelineConfig;
use recipe_recommender::matrix::{build_raw_matrix, load_recipe_list, CanonicalMatrix, DuplicateTitlePolicy, RawMatrix};
use recipe_recommender::scoring::WeightConfig;
use recipe_recommender::taxonomy::Taxonomy;
use recipe_recommender::PipelineContext;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("recipe_recommender=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn load_taxonomy(path: &Path) -> Result<Taxonomy> {
    Taxonomy::load(path).with_context(|| format!("Failed to load taxonomy from '{}'", path.display()))
}

fn load_weights(path: &Path) -> Result<WeightConfig> {
    WeightConfig::load(path)
        .with_context(|| format!("Failed to load weight configuration from '{}'", path.display()))
}

fn main() -> Result<()> {
    init_tracing();

    let cli: Cli = parse_args();
    let config = PipelineConfig::from_env();
    let taxonomy_path = cli.taxonomy.unwrap_or(config.taxonomy_path);
    let weights_path = cli.weights.unwrap_or(config.weights_path);

    match cli.command {
        Command::BuildMatrix { recipes, output } => {
            let scraped = load_recipe_list(&recipes)
                .with_context(|| format!("Failed to read recipes from '{}'", recipes.display()))?;
            let (raw, stats) = build_raw_matrix(&scraped)?;
            raw.write_csv(&output)
                .with_context(|| format!("Failed to write raw matrix to '{}'", output.display()))?;
            println!(
                "Matrix: {} recipes x {} ingredients ({} failed, {} without ingredients) -> {}",
                raw.len(),
                stats.unique_ingredients,
                stats.failed,
                stats.skipped_empty,
                output.display()
            );
        }

        Command::Consolidate {
            input,
            output,
            report,
            snapshot,
            disambiguate_titles,
        } => {
            let taxonomy = load_taxonomy(&taxonomy_path)?;
            let weight_config = load_weights(&weights_path)?;
            let raw = RawMatrix::from_csv_path(&input)
                .with_context(|| format!("Failed to read raw matrix from '{}'", input.display()))?;
            let policy = if disambiguate_titles {
                DuplicateTitlePolicy::Disambiguate
            } else {
                DuplicateTitlePolicy::Reject
            };

            let (context, cleaning_report) = PipelineContext::build(taxonomy, &weight_config, &raw, policy)
                .context("Consolidation failed")?;
            context
                .matrix()
                .write_csv(&output)
                .with_context(|| format!("Failed to write canonical matrix to '{}'", output.display()))?;
            info!(path = %output.display(), "Saved canonical matrix");

            if let Some(path) = snapshot {
                context
                    .matrix()
                    .save_snapshot(&path)
                    .with_context(|| format!("Failed to write snapshot to '{}'", path.display()))?;
                info!(path = %path.display(), "Saved matrix snapshot");
            }
            if let Some(path) = report {
                let json = serde_json::to_string_pretty(&cleaning_report)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write report to '{}'", path.display()))?;
            }

            print!("{}", cleaning_report.render_text(context.matrix()));
        }

        Command::Recommend {
            ingredients,
            num_recipes,
            matrix,
            snapshot,
            overrides,
            json,
        } => {
            let taxonomy = load_taxonomy(&taxonomy_path)?;
            let weight_config = load_weights(&weights_path)?.with_overrides(overrides);
            let canonical = match snapshot {
                Some(path) => CanonicalMatrix::load_snapshot(&path)
                    .with_context(|| format!("Failed to load snapshot from '{}'", path.display()))?,
                None => {
                    let path: PathBuf = matrix.unwrap_or(config.matrix_path);
                    CanonicalMatrix::from_csv_path(&path)
                        .with_context(|| format!("Failed to load canonical matrix from '{}'", path.display()))?
                }
            };

            let context = PipelineContext::from_canonical(taxonomy, &weight_config, canonical);
            let ranked = context.recommend(&ingredients, num_recipes)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&ranked)?);
            } else {
                println!("Top recommendations:");
                for (rank, recipe) in ranked.iter().enumerate() {
                    println!("{:>3}. {} (score {})", rank + 1, recipe.title, recipe.score);
                }
            }
        }

        Command::Weights { overrides } => {
            let taxonomy = load_taxonomy(&taxonomy_path)?;
            let weight_config = load_weights(&weights_path)?.with_overrides(overrides);
            let table = recipe_recommender::scoring::build_weight_table(&taxonomy, &weight_config);
            for (name, weight) in table.sorted() {
                let category = taxonomy.category_of(name).unwrap_or("-");
                println!("{:<24} {:<16} {}", name, category, weight);
            }
            println!("(default weight for anything else: {})", table.default_weight());
        }
    }

    Ok(())
}
