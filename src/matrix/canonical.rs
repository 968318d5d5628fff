use super::csv_io::{read_binary_table, write_binary_table};
use super::ensure_unique_columns;
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

const SNAPSHOT_VERSION: u32 = 1;

/// One recipe row borrowed from a `CanonicalMatrix`.
#[derive(Debug, Clone, Copy)]
pub struct RecipeRow<'a> {
    pub index: usize,
    pub title: &'a str,
    pub values: &'a [bool],
}

impl RecipeRow<'_> {
    pub fn has(&self, column: usize) -> bool {
        self.values.get(column).copied().unwrap_or(false)
    }
}

/// Recipe x standardized-ingredient matrix. Titles and column names are
/// unique, so every (recipe, ingredient) lookup yields a single value.
/// Instances are immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalMatrix {
    titles: Vec<String>,
    columns: Vec<String>,
    rows: Vec<Vec<bool>>,
    column_index: HashMap<String, usize>,
    row_index: HashMap<String, usize>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    titles: &'a [String],
    columns: &'a [String],
    rows: &'a [Vec<bool>],
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    titles: Vec<String>,
    columns: Vec<String>,
    rows: Vec<Vec<bool>>,
}

impl CanonicalMatrix {
    pub fn new(titles: Vec<String>, columns: Vec<String>, rows: Vec<Vec<bool>>) -> Result<Self> {
        ensure_unique_columns(&columns)?;
        if titles.len() != rows.len() {
            return Err(PipelineError::RaggedRow {
                row: titles.len().min(rows.len()) + 1,
                expected: titles.len(),
                found: rows.len(),
            });
        }

        let mut row_index = HashMap::with_capacity(titles.len());
        for (index, (title, row)) in titles.iter().zip(&rows).enumerate() {
            if row.len() != columns.len() {
                return Err(PipelineError::RaggedRow {
                    row: index + 1,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
            if row_index.insert(title.clone(), index).is_some() {
                return Err(PipelineError::AmbiguousRowKey(title.clone()));
            }
        }

        let column_index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();

        Ok(Self {
            titles,
            columns,
            rows,
            column_index,
            row_index,
        })
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let matrix = Self::from_reader(BufReader::new(file))?;
        debug!(path = %path.display(), recipes = matrix.len(), columns = matrix.columns.len(), "Loaded canonical matrix");
        Ok(matrix)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let table = read_binary_table(reader)?;
        Self::new(table.titles, table.columns, table.rows)
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }

    pub fn write_to<W: std::io::Write>(&self, writer: W) -> Result<()> {
        write_binary_table(writer, &self.titles, &self.columns, &self.rows)
    }

    /// Binary snapshot for fast reloads. Loading re-checks every invariant.
    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            titles: &self.titles,
            columns: &self.columns,
            rows: &self.rows,
        };
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, &snapshot)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load_snapshot(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let snapshot: Snapshot = bincode::deserialize_from(BufReader::new(file))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(PipelineError::Snapshot(Box::new(bincode::ErrorKind::Custom(format!(
                "unsupported snapshot version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            )))));
        }
        Self::new(snapshot.titles, snapshot.columns, snapshot.rows)
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index.contains_key(name)
    }

    pub fn row(&self, index: usize) -> Option<RecipeRow<'_>> {
        Some(RecipeRow {
            index,
            title: self.titles.get(index)?,
            values: self.rows.get(index)?,
        })
    }

    pub fn recipe(&self, title: &str) -> Option<RecipeRow<'_>> {
        self.row(*self.row_index.get(title)?)
    }

    pub fn recipes(&self) -> impl ExactSizeIterator<Item = RecipeRow<'_>> + '_ {
        self.titles
            .iter()
            .zip(&self.rows)
            .enumerate()
            .map(|(index, (title, values))| RecipeRow {
                index,
                title,
                values,
            })
    }

    /// Value of one cell, `None` when either key is unknown.
    pub fn get(&self, title: &str, column: &str) -> Option<bool> {
        let column = self.column_index(column)?;
        self.recipe(title).map(|row| row.has(column))
    }

    /// Number of recipes containing each column, in column order.
    pub fn column_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.columns.len()];
        for row in &self.rows {
            for (count, &present) in counts.iter_mut().zip(row) {
                if present {
                    *count += 1;
                }
            }
        }
        counts
    }
}
