//! Turns scraped recipes (title + list of ingredient labels) into a raw
//! binary matrix ready for consolidation.

use super::raw::RawMatrix;
use crate::error::Result;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct ScrapedRecipe {
    pub recipe_title: String,
    #[serde(default)]
    pub ingredients: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub processed: usize,
    pub skipped_empty: usize,
    pub failed: usize,
    pub unique_ingredients: usize,
}

pub fn load_recipe_list(csv_path: &Path) -> Result<Vec<ScrapedRecipe>> {
    let file = std::fs::File::open(csv_path)?;
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);
    let mut recipes = Vec::new();
    for result in rdr.deserialize() {
        let recipe: ScrapedRecipe = result?;
        recipes.push(recipe);
    }
    Ok(recipes)
}

/// Builds the matrix with ingredient columns sorted lexicographically and
/// one row per recipe that has a readable ingredient list.
pub fn build_raw_matrix(recipes: &[ScrapedRecipe]) -> Result<(RawMatrix, BuildStats)> {
    let mut stats = BuildStats::default();
    let mut parsed: Vec<(&str, Vec<String>)> = Vec::with_capacity(recipes.len());

    for recipe in recipes {
        let text = match recipe.ingredients.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => {
                stats.skipped_empty += 1;
                continue;
            }
        };
        match parse_ingredient_list(text) {
            Some(ingredients) => parsed.push((recipe.recipe_title.as_str(), ingredients)),
            None => {
                warn!(recipe = %recipe.recipe_title, "Unreadable ingredient list, skipping recipe");
                stats.failed += 1;
            }
        }
    }

    let vocabulary: BTreeSet<&str> = parsed
        .iter()
        .flat_map(|(_, ingredients)| ingredients.iter().map(String::as_str))
        .collect();
    let column_of: HashMap<&str, usize> = vocabulary
        .iter()
        .enumerate()
        .map(|(i, name)| (*name, i))
        .collect();

    let mut titles = Vec::with_capacity(parsed.len());
    let mut rows = Vec::with_capacity(parsed.len());
    for (title, ingredients) in &parsed {
        let mut row = vec![false; vocabulary.len()];
        for ingredient in ingredients {
            row[column_of[ingredient.as_str()]] = true;
        }
        titles.push(title.to_string());
        rows.push(row);
    }

    stats.processed = rows.len();
    stats.unique_ingredients = vocabulary.len();
    info!(
        processed = stats.processed,
        failed = stats.failed,
        skipped = stats.skipped_empty,
        unique_ingredients = stats.unique_ingredients,
        "Built raw recipe matrix"
    );

    let columns = vocabulary.into_iter().map(str::to_string).collect();
    let matrix = RawMatrix::new(titles, columns, rows)?;
    Ok((matrix, stats))
}

/// Accepts a JSON array of strings or a Python list literal such as
/// `['ail', "huile d'olive"]`.
pub fn parse_ingredient_list(text: &str) -> Option<Vec<String>> {
    if let Ok(list) = serde_json::from_str::<Vec<String>>(text) {
        return Some(list);
    }
    parse_python_list(text)
}

fn parse_python_list(text: &str) -> Option<Vec<String>> {
    let inner = text.trim().strip_prefix('[')?.strip_suffix(']')?;
    let mut items = Vec::new();
    let mut chars = inner.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let quote = match chars.next() {
            None => break,
            Some(q @ ('\'' | '"')) => q,
            Some(_) => return None,
        };

        let mut item = String::new();
        loop {
            match chars.next()? {
                '\\' => item.push(chars.next()?),
                c if c == quote => break,
                c => item.push(c),
            }
        }
        items.push(item);

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(_) => return None,
        }
    }
    Some(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn recipe(title: &str, ingredients: Option<&str>) -> ScrapedRecipe {
        ScrapedRecipe {
            recipe_title: title.to_string(),
            ingredients: ingredients.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_python_and_json_lists() {
        assert_eq!(
            parse_ingredient_list(r#"['ail', "huile d'olive", 'sel']"#),
            Some(vec!["ail".to_string(), "huile d'olive".to_string(), "sel".to_string()])
        );
        assert_eq!(
            parse_ingredient_list(r#"["oignon"]"#),
            Some(vec!["oignon".to_string()])
        );
        assert_eq!(parse_ingredient_list("[]"), Some(vec![]));
        assert_eq!(parse_ingredient_list("['ail', 'sel'"), None);
        assert_eq!(parse_ingredient_list("ail, sel"), None);
    }

    #[test]
    fn test_build_raw_matrix() -> anyhow::Result<()> {
        let recipes = vec![
            recipe("Soupe", Some("['oignon', 'ail']")),
            recipe("Vide", None),
            recipe("Cassé", Some("not a list")),
            recipe("Tarte", Some("['sel', 'oignon']")),
        ];
        let (matrix, stats) = build_raw_matrix(&recipes)?;
        assert_eq!(matrix.columns(), &["ail", "oignon", "sel"]);
        assert_eq!(matrix.titles(), &["Soupe", "Tarte"]);
        assert_eq!(matrix.rows(), &[vec![true, true, false], vec![false, true, true]]);
        assert_eq!(
            stats,
            BuildStats {
                processed: 2,
                skipped_empty: 1,
                failed: 1,
                unique_ingredients: 3
            }
        );
        Ok(())
    }

    #[test]
    fn test_load_recipe_list() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "recipe_title,ingredients")?;
        writeln!(file, "Soupe,\"['oignon', 'ail']\"")?;
        writeln!(file, "Vide,")?;
        file.flush()?;

        let recipes = load_recipe_list(file.path())?;
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].ingredients.as_deref(), Some("['oignon', 'ail']"));
        Ok(())
    }
}
