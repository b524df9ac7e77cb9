//! Column-oriented in-memory table loaded from CSV.
//!
//! Cells start out as optional strings. The normalizer later converts
//! designated columns to numeric in place.

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::SectionError;

/// One column of a [`Table`]. `None` marks a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Text(Vec<Option<String>>),
    Numeric(Vec<Option<f64>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Text(cells) => cells.len(),
            Column::Numeric(cells) => cells.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the numeric cells, or `None` for a text column.
    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match self {
            Column::Numeric(cells) => Some(cells),
            Column::Text(_) => None,
        }
    }

    /// Renders the cell at `row` as a grouping key.
    ///
    /// Numeric keys keep at least one decimal place so a rating of `4`
    /// groups as `4.0`.
    pub fn key_at(&self, row: usize) -> Option<String> {
        match self {
            Column::Text(cells) => cells.get(row).cloned().flatten(),
            Column::Numeric(cells) => cells.get(row).copied().flatten().map(format_numeric_key),
        }
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            Column::Text(cells) => cells.get(row).is_none_or(Option::is_none),
            Column::Numeric(cells) => cells.get(row).is_none_or(Option::is_none),
        }
    }

    fn retain_rows(&self, keep: &[bool]) -> Column {
        match self {
            Column::Text(cells) => Column::Text(
                cells
                    .iter()
                    .zip(keep)
                    .filter(|(_, k)| **k)
                    .map(|(c, _)| c.clone())
                    .collect(),
            ),
            Column::Numeric(cells) => Column::Numeric(
                cells
                    .iter()
                    .zip(keep)
                    .filter(|(_, k)| **k)
                    .map(|(c, _)| *c)
                    .collect(),
            ),
        }
    }
}

fn format_numeric_key(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// A named dataset held fully in memory.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    headers: Vec<String>,
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Reads a CSV file from disk.
    #[tracing::instrument(skip(path), fields(path = %path.display()))]
    pub fn from_path(name: &str, path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open dataset '{name}' at {}", path.display()))?;
        Self::from_reader(name, file)
    }

    /// Reads CSV from any reader. The first record is the header row.
    ///
    /// Short rows are padded with missing cells; empty cells and cells that
    /// are not valid UTF-8 are missing.
    pub fn from_reader<R: Read>(name: &str, reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers: Vec<String> = rdr
            .byte_headers()
            .with_context(|| format!("malformed CSV header in dataset '{name}'"))?
            .iter()
            .map(|h| String::from_utf8_lossy(h).into_owned())
            .collect();
        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
        let mut rows = 0usize;
        let mut invalid = 0usize;

        for result in rdr.byte_records() {
            let record = result.with_context(|| format!("malformed CSV in dataset '{name}'"))?;
            for (idx, column) in cells.iter_mut().enumerate() {
                let value = match record.get(idx).map(std::str::from_utf8) {
                    Some(Ok(v)) if !v.trim().is_empty() => Some(v.to_string()),
                    Some(Err(_)) => {
                        invalid += 1;
                        None
                    }
                    _ => None,
                };
                column.push(value);
            }
            rows += 1;
        }

        if invalid > 0 {
            warn!(dataset = name, cells = invalid, "Cells with invalid UTF-8 treated as missing");
        }
        debug!(dataset = name, rows, columns = headers.len(), "CSV loaded");

        Ok(Self {
            name: name.to_string(),
            headers,
            columns: cells.into_iter().map(Column::Text).collect(),
            rows,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|idx| &self.columns[idx])
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.position(name).map(move |idx| &mut self.columns[idx])
    }

    /// Like [`Table::column`], but reports a missing-column condition.
    pub fn require(&self, name: &str) -> Result<&Column, SectionError> {
        self.column(name)
            .ok_or_else(|| SectionError::MissingColumn(name.to_string()))
    }

    /// Like [`Table::require`], and the column must be numeric.
    pub fn require_numeric(&self, name: &str) -> Result<&[Option<f64>], SectionError> {
        self.require(name)?
            .as_numeric()
            .ok_or_else(|| SectionError::NotNumeric(name.to_string()))
    }

    /// Rewrites every header through `f`.
    pub fn rename_headers(&mut self, f: impl Fn(&str) -> String) {
        for header in &mut self.headers {
            *header = f(header);
        }
    }

    /// Returns a copy of the table without rows lacking a value in `column`.
    pub fn drop_missing(&self, column: &str) -> Result<Table, SectionError> {
        let col = self.require(column)?;
        let keep: Vec<bool> = (0..self.rows).map(|row| !col.is_missing(row)).collect();
        let rows = keep.iter().filter(|k| **k).count();

        Ok(Table {
            name: self.name.clone(),
            headers: self.headers.clone(),
            columns: self.columns.iter().map(|c| c.retain_rows(&keep)).collect(),
            rows,
        })
    }
}
