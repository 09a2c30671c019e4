//! Ragged CSV ingestion.
//!
//! Workshop tables are hand-maintained spreadsheets exported without headers,
//! so rows rarely share a column count. Everything is normalised into a
//! rectangular [`Table`] where a missing cell and an empty cell look the same.

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv read error: {0}")]
    Csv(#[from] csv::Error),
}

/// Uniform table of string cells. Short rows are padded with empty cells.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    rows: Vec<Vec<String>>,
    width: usize,
}

impl Table {
    /// Normalise raw records into a rectangle.
    ///
    /// The width is `max_columns` when given, otherwise the longest record.
    /// Records wider than the width are dropped.
    pub fn from_records(records: Vec<Vec<String>>, max_columns: Option<usize>) -> Self {
        let width = max_columns
            .unwrap_or_else(|| records.iter().map(Vec::len).max().unwrap_or(0));

        let mut rows = Vec::with_capacity(records.len());
        for (line, mut record) in records.into_iter().enumerate() {
            if record.len() > width {
                warn!(
                    line = line + 1,
                    columns = record.len(),
                    width,
                    "dropping row with too many columns"
                );
                continue;
            }
            record.resize(width, String::new());
            rows.push(record);
        }

        Self { rows, width }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, cells)| Row { index, cells })
    }
}

/// Borrowed view of a single table row.
#[derive(Clone, Copy, Debug)]
pub struct Row<'a> {
    index: usize,
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Zero-based position of the row within the normalised table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Cell contents, or `None` when the cell is empty or past the row end.
    pub fn cell(&self, column: usize) -> Option<&'a str> {
        self.cells
            .get(column)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// Loads comma-delimited, header-less files into [`Table`]s.
#[derive(Clone, Debug, Default)]
pub struct TableLoader {
    max_columns: Option<usize>,
}

impl TableLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the table width instead of deriving it from the longest row.
    pub fn with_max_columns(mut self, max_columns: usize) -> Self {
        self.max_columns = Some(max_columns);
        self
    }

    pub fn load(&self, path: &Path) -> Result<Table, TableError> {
        let file = File::open(path).map_err(|source| TableError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let table = self.read(file)?;
        debug!(
            path = %path.display(),
            rows = table.len(),
            width = table.width(),
            "loaded table"
        );
        Ok(table)
    }

    pub fn read<R: Read>(&self, reader: R) -> Result<Table, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = Vec::new();
        for result in reader.records() {
            match result {
                Ok(record) => records.push(record.iter().map(str::to_string).collect()),
                Err(error) if error.is_io_error() => return Err(error.into()),
                Err(error) => warn!("skipping malformed row: {error}"),
            }
        }

        Ok(Table::from_records(records, self.max_columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(input: &str) -> Table {
        TableLoader::new().read(input.as_bytes()).unwrap()
    }

    #[test]
    fn pads_short_rows_to_widest() {
        let table = load("Sword,Ingot,2,Handle,1\nIngot,Ore,3\n");
        assert_eq!(table.width(), 5);
        assert_eq!(table.len(), 2);

        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows[1].cell(2), Some("3"));
        assert_eq!(rows[1].cell(3), None);
        assert_eq!(rows[1].cell(42), None);
    }

    #[test]
    fn empty_cells_read_as_absent() {
        let table = load("Flax,West Ronka,,East Ronka\n");
        let row = table.rows().next().unwrap();
        assert_eq!(row.cell(1), Some("West Ronka"));
        assert_eq!(row.cell(2), None);
        assert_eq!(row.cell(3), Some("East Ronka"));
    }

    #[test]
    fn drops_rows_wider_than_fixed_width() {
        let table = TableLoader::new()
            .with_max_columns(3)
            .read("a,b,c\nd,e,f,g\nh\n".as_bytes())
            .unwrap();
        assert_eq!(table.width(), 3);
        let firsts: Vec<_> = table.rows().filter_map(|row| row.cell(0)).collect();
        assert_eq!(firsts, vec!["a", "h"]);
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let table = load("");
        assert!(table.is_empty());
        assert_eq!(table.width(), 0);
    }

    #[test]
    fn missing_file_reports_path() {
        let error = TableLoader::new()
            .load(Path::new("definitely/not/here.csv"))
            .unwrap_err();
        assert!(matches!(error, TableError::Open { .. }));
        assert!(error.to_string().contains("here.csv"));
    }
}
