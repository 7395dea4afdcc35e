//! Loading and normalizing semicolon-separated spreadsheet exports.
//!
//! Exports from the shift planner wrap cells as `="value"` so spreadsheet
//! programs keep them as text. Normalization strips those `=`/`"` artifacts
//! from both ends of every header and cell.

use std::path::Path;

use ::csv::ReaderBuilder;

use crate::constants::CSV_DELIMITER;
use crate::error::{ImportError, ImportResult};

/// A loaded CSV file: one header row plus text cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// One data row, addressed by column name.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    /// 1-based position among the data rows (header not counted)
    pub number: usize,
    headers: &'a [String],
    values: &'a [String],
}

impl<'a> Row<'a> {
    pub fn get(&self, column: &str) -> ImportResult<&'a str> {
        self.headers
            .iter()
            .position(|h| h == column)
            .and_then(|idx| self.values.get(idx))
            .map(|v| v.as_str())
            .ok_or_else(|| ImportError::MissingField(column.to_string()))
    }
}

impl Table {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().enumerate().map(|(idx, values)| Row {
            number: idx + 1,
            headers: &self.headers,
            values,
        })
    }

    /// Fail with the first column in `columns` that the header lacks.
    pub fn require_columns(&self, columns: &[&str]) -> ImportResult<()> {
        match columns
            .iter()
            .find(|column| !self.headers.iter().any(|h| h == *column))
        {
            Some(missing) => Err(ImportError::MissingField(missing.to_string())),
            None => Ok(()),
        }
    }
}

/// Read a file from disk and normalize it.
pub fn load_and_clean(path: &Path) -> ImportResult<Table> {
    Ok(clean(load(path)?))
}

/// Read a semicolon-separated UTF-8 file (optionally BOM-prefixed).
pub fn load(path: &Path) -> ImportResult<Table> {
    let bytes = std::fs::read(path)
        .map_err(|e| ImportError::DataLoad(format!("{}: {e}", path.display())))?;

    let text = String::from_utf8(bytes).map_err(|e| {
        ImportError::DataLoad(format!("{}: not valid UTF-8 ({e})", path.display()))
    })?;

    parse(&text)
}

/// Parse CSV text. A leading byte-order mark is ignored.
///
/// Short rows are padded with empty cells so they fail later, row by row.
/// Rows with more fields than the header reject the whole file.
pub fn parse(text: &str) -> ImportResult<Table> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = ReaderBuilder::new()
        .delimiter(CSV_DELIMITER)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ImportError::DataLoad(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(ImportError::DataLoad("missing header row".into()));
    }

    let width = headers.len();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ImportError::DataLoad(e.to_string()))?;

        if record.len() > width {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            return Err(ImportError::DataLoad(format!(
                "line {line}: expected {width} fields, found {}",
                record.len()
            )));
        }

        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    Ok(Table { headers, rows })
}

/// Strip `=` and `"` from both ends of every header and cell.
pub fn clean(table: Table) -> Table {
    Table {
        headers: table.headers.iter().map(|h| strip_artifacts(h)).collect(),
        rows: table
            .rows
            .iter()
            .map(|row| row.iter().map(|v| strip_artifacts(v)).collect())
            .collect(),
    }
}

fn strip_artifacts(value: &str) -> String {
    value.trim_matches(|c| c == '=' || c == '"').to_string()
}
