use super::csv_io::{read_binary_table, write_binary_table};
use super::ensure_unique_columns;
use crate::error::{PipelineError, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Recipe x raw-ingredient-label matrix, straight from scraping.
/// Titles may repeat; column labels may not.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawMatrix {
    titles: Vec<String>,
    columns: Vec<String>,
    rows: Vec<Vec<bool>>,
}

impl RawMatrix {
    pub fn new(titles: Vec<String>, columns: Vec<String>, rows: Vec<Vec<bool>>) -> Result<Self> {
        ensure_unique_columns(&columns)?;
        if titles.len() != rows.len() {
            return Err(PipelineError::RaggedRow {
                row: titles.len().min(rows.len()) + 1,
                expected: titles.len(),
                found: rows.len(),
            });
        }
        for (index, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(PipelineError::RaggedRow {
                    row: index + 1,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
        }
        Ok(Self {
            titles,
            columns,
            rows,
        })
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let table = read_binary_table(reader)?;
        Self::new(table.titles, table.columns, table.rows)
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        write_binary_table(file, &self.titles, &self.columns, &self.rows)
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn value(&self, row: usize, column: usize) -> bool {
        self.rows[row][column]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_duplicate_labels() {
        let result = RawMatrix::new(
            vec!["A".into()],
            vec!["ail".into(), "ail".into()],
            vec![vec![true, false]],
        );
        assert!(matches!(result, Err(PipelineError::DuplicateColumn(c)) if c == "ail"));
    }

    #[test]
    fn test_new_rejects_short_row() {
        let result = RawMatrix::new(
            vec!["A".into(), "B".into()],
            vec!["ail".into(), "sel".into()],
            vec![vec![true, false], vec![true]],
        );
        assert!(matches!(
            result,
            Err(PipelineError::RaggedRow { row: 2, expected: 2, found: 1 })
        ));
    }

    #[test]
    fn test_duplicate_titles_are_allowed() -> anyhow::Result<()> {
        let csv = ",ail\nSoupe,1\nSoupe,0\n";
        let raw = RawMatrix::from_reader(csv.as_bytes())?;
        assert_eq!(raw.len(), 2);
        assert!(raw.value(0, 0));
        assert!(!raw.value(1, 0));
        Ok(())
    }
}
