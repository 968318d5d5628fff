use crate::error::{PipelineError, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::io::{Read, Write};

/// A binary recipe x ingredient table as read from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryTable {
    pub titles: Vec<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<bool>>,
}

fn parse_cell(value: &str, row: usize, column: &str) -> Result<bool> {
    match value.trim() {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(PipelineError::InvalidCell {
            row,
            column: column.to_string(),
            value: other.to_string(),
        }),
    }
}

/// Reads a table whose first column holds recipe titles and whose header
/// names the ingredient columns. The title column header is ignored.
pub fn read_binary_table<R: Read>(reader: R) -> Result<BinaryTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(PipelineError::MissingHeader);
    }
    let columns: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
    let expected = columns.len() + 1;

    let mut titles = Vec::new();
    let mut rows = Vec::new();
    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        // 1-based data row numbers, header excluded
        let row_number = index + 1;
        if record.len() != expected {
            return Err(PipelineError::RaggedRow {
                row: row_number,
                expected,
                found: record.len(),
            });
        }
        let mut cells = record.iter();
        let title = cells.next().unwrap_or_default().to_string();
        let values = cells
            .zip(&columns)
            .map(|(cell, column)| parse_cell(cell, row_number, column))
            .collect::<Result<Vec<bool>>>()?;
        titles.push(title);
        rows.push(values);
    }

    Ok(BinaryTable {
        titles,
        columns,
        rows,
    })
}

/// Writes the table in the same shape `read_binary_table` expects.
pub fn write_binary_table<W: Write>(
    writer: W,
    titles: &[String],
    columns: &[String],
    rows: &[Vec<bool>],
) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);

    let mut header = Vec::with_capacity(columns.len() + 1);
    header.push("");
    header.extend(columns.iter().map(String::as_str));
    wtr.write_record(&header)?;

    for (title, values) in titles.iter().zip(rows) {
        let mut record = Vec::with_capacity(values.len() + 1);
        record.push(title.as_str());
        record.extend(values.iter().map(|&v| if v { "1" } else { "0" }));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_table() -> anyhow::Result<()> {
        let csv = ",ail,oignon\nSoupe,1,0\nTarte,0, 1\n";
        let table = read_binary_table(csv.as_bytes())?;
        assert_eq!(table.columns, vec!["ail", "oignon"]);
        assert_eq!(table.titles, vec!["Soupe", "Tarte"]);
        assert_eq!(table.rows, vec![vec![true, false], vec![false, true]]);
        Ok(())
    }

    #[test]
    fn test_read_rejects_non_binary_cell() {
        let csv = ",ail\nSoupe,2\n";
        match read_binary_table(csv.as_bytes()) {
            Err(PipelineError::InvalidCell { row, column, value }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "ail");
                assert_eq!(value, "2");
            }
            other => panic!("expected InvalidCell, got {:?}", other),
        }
    }

    #[test]
    fn test_read_rejects_ragged_row() {
        let csv = ",ail,oignon\nSoupe,1\n";
        assert!(matches!(
            read_binary_table(csv.as_bytes()),
            Err(PipelineError::RaggedRow { row: 1, expected: 3, found: 2 })
        ));
    }

    #[test]
    fn test_written_table_reads_back() -> anyhow::Result<()> {
        let titles = vec!["Poulet, basquaise".to_string()];
        let columns = vec!["poultry".to_string(), "unmapped_safran".to_string()];
        let rows = vec![vec![true, false]];
        let mut buffer = Vec::new();
        write_binary_table(&mut buffer, &titles, &columns, &rows)?;

        let text = String::from_utf8(buffer.clone())?;
        assert!(text.starts_with(",poultry,unmapped_safran\n"));

        let table = read_binary_table(buffer.as_slice())?;
        assert_eq!(table.titles, titles);
        assert_eq!(table.columns, columns);
        assert_eq!(table.rows, rows);
        Ok(())
    }
}
