use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

use crate::error::PipelineError;

/// A single-sheet tabular file held fully in memory.
///
/// Column names come from the header row of the source file and are the only
/// schema contract in the pipeline. Every row is padded (or truncated) to the
/// header width at read time, so cell access by column index never goes out
/// of bounds.
#[derive(Debug, Clone)]
pub struct Table {
    /// Column names, in file order.
    pub headers: Vec<String>,
    /// One `Vec<String>` per data row, each exactly `headers.len()` wide.
    pub rows: Vec<Vec<String>>,
}

/// A cell is blank when it trims to the empty string. Blank is the CSV
/// rendition of a null spreadsheet cell; every nullness check in the
/// pipeline goes through here.
pub fn is_blank(cell: &str) -> bool {
    cell.trim().is_empty()
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Read `path` as a headered CSV file.
    ///
    /// The reader is flexible so records with a different field count than
    /// the header still parse; short rows are padded with blanks and long
    /// rows truncated to the header width.
    pub fn read_csv(path: &Path) -> Result<Table> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open input file {:?}", path))?;
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let mut records = rdr.records();
        let headers: Vec<String> = match records.next() {
            Some(first) => first
                .with_context(|| format!("CSV parse error in header of {:?}", path))?
                .iter()
                .map(|s| s.trim().to_string())
                .collect(),
            None => return Err(anyhow!("Input file {:?} is empty", path)),
        };

        let width = headers.len();
        let mut rows = Vec::new();
        for (idx, result) in records.enumerate() {
            let record = result
                .with_context(|| format!("CSV parse error in {:?} at record {}", path, idx + 1))?;
            let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
            row.resize(width, String::new());
            rows.push(row);
        }

        debug!(
            path = %path.display(),
            columns = width,
            rows = rows.len(),
            "read table"
        );
        Ok(Table { headers, rows })
    }

    /// Write the table to `path` as headered CSV.
    ///
    /// Writes to a `.tmp` sibling first and renames into place, so a failed
    /// write never leaves a half-finished file under the final name.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let tmp_path = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => path.with_extension(format!("{}.tmp", ext)),
            None => path.with_extension("tmp"),
        };

        let tmp_file = File::create(&tmp_path)
            .with_context(|| format!("Failed to create output file {:?}", tmp_path))?;
        let mut wtr = WriterBuilder::new().from_writer(tmp_file);
        wtr.write_record(&self.headers)
            .with_context(|| format!("Failed to write header row to {:?}", tmp_path))?;
        for row in &self.rows {
            wtr.write_record(row)
                .with_context(|| format!("Failed to write row to {:?}", tmp_path))?;
        }
        wtr.flush()
            .with_context(|| format!("Failed to flush {:?}", tmp_path))?;
        drop(wtr);

        fs::rename(&tmp_path, path)
            .with_context(|| format!("Failed to finalize output file {:?}", path))?;
        debug!(path = %path.display(), rows = self.rows.len(), "wrote table");
        Ok(())
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Index of the column named `name`, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of the column named `name`, or `MissingColumn` naming `table`
    /// in the diagnostic.
    pub fn require_column(&self, name: &str, table: &str) -> Result<usize, PipelineError> {
        self.column_index(name)
            .ok_or_else(|| PipelineError::MissingColumn {
                table: table.to_string(),
                column: name.to_string(),
            })
    }

    /// Indices of every column whose name contains `needle` (case-sensitive).
    pub fn columns_containing(&self, needle: &str) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.contains(needle))
            .map(|(i, _)| i)
            .collect()
    }

    /// Clone out the values of one column, top to bottom.
    pub fn column_values(&self, idx: usize) -> Vec<String> {
        self.rows.iter().map(|r| r[idx].clone()).collect()
    }

    /// Insert a column at `idx` with the given values. `values` must have
    /// one entry per row.
    pub fn insert_column(&mut self, idx: usize, name: &str, values: Vec<String>) {
        assert_eq!(values.len(), self.rows.len(), "column height mismatch");
        self.headers.insert(idx, name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(idx, value);
        }
    }

    /// Keep only the rows for which `pred` returns true.
    pub fn retain_rows<F>(&mut self, mut pred: F)
    where
        F: FnMut(&[String]) -> bool,
    {
        self.rows.retain(|row| pred(row));
    }

    /// Split the table into (rows matching `pred`, rows not matching),
    /// preserving row order in both halves.
    pub fn partition_rows<F>(&self, mut pred: F) -> (Table, Table)
    where
        F: FnMut(&[String]) -> bool,
    {
        let mut hit = Table::new(self.headers.clone());
        let mut miss = Table::new(self.headers.clone());
        for row in &self.rows {
            if pred(row) {
                hit.rows.push(row.clone());
            } else {
                miss.rows.push(row.clone());
            }
        }
        (hit, miss)
    }

    /// Append a constant-valued column on the right.
    pub fn append_constant_column(&mut self, name: &str, value: &str) {
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(value.to_string());
        }
    }
}
