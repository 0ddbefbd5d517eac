//! RecordSource: one CSV result file in, one [`Dataset`] out.
//!
//! The source is the only place that touches raw file bytes. Its contract is
//! deliberately narrow:
//!
//! - Header names are matched exactly against [`crate::schema`] columns.
//!   Unknown columns are ignored.
//! - Empty cells become absent values, never zero.
//! - Every failure carries the offending path so a caller can log it and move
//!   on to the next file.
//!
//! # Errors
//!
//! | Condition | Error |
//! |-----------|-------|
//! | file missing or unreadable | [`PlotError::Io`] |
//! | empty file, bad UTF-8, ragged row, non-numeric cell | [`PlotError::Parse`] |
//! | `Queuetype` (or a required column) absent | [`PlotError::Schema`] |

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;

use crate::error::{PlotError, Result};
use crate::record::{Dataset, Record};
use crate::schema::{Field, QUEUE_TYPE};

/// Reader for a single benchmark result file.
pub struct RecordSource;

impl RecordSource {
    /// Load every row of `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Dataset> {
        Self::require(path, &[])
    }

    /// Load `path`, additionally failing with [`PlotError::Schema`] if any of
    /// `required` is not a column of the file.
    ///
    /// `Queuetype` is always required.
    pub fn require(path: impl AsRef<Path>, required: &[Field]) -> Result<Dataset> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| PlotError::io(path, e))?;
        let mut dataset = Self::from_reader(file, path, required)?;
        dataset.stamp_source(path);
        debug!("Loaded {} records from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Parse CSV content from any reader. `path` is only used in diagnostics.
    pub fn from_reader<R: Read>(reader: R, path: &Path, required: &[Field]) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Fields)
            .from_reader(reader);

        let headers = reader.headers().map_err(|e| csv_error(path, e))?.clone();
        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err(PlotError::parse(path, "file is empty or has no header row"));
        }

        let columns = ColumnMap::from_headers(headers.iter());
        if columns.queue_type.is_none() {
            return Err(PlotError::Schema {
                path: path.to_path_buf(),
                column: QUEUE_TYPE.to_string(),
            });
        }
        if let Some(missing) = required.iter().find(|f| !columns.contains(**f)) {
            return Err(PlotError::Schema {
                path: path.to_path_buf(),
                column: missing.column_name().to_string(),
            });
        }

        let mut dataset = Dataset::new();
        for row in reader.records() {
            let row = row.map_err(|e| csv_error(path, e))?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);
            dataset.push(columns.convert(&row, line, path)?);
        }

        Ok(dataset)
    }
}

/// Header position of each recognised column.
struct ColumnMap {
    queue_type: Option<usize>,
    fields: Vec<(usize, Field)>,
}

impl ColumnMap {
    fn from_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Self {
        let mut queue_type = None;
        let mut fields: Vec<(usize, Field)> = Vec::new();

        for (idx, name) in headers.enumerate() {
            match Field::from_column(name) {
                Some(Field::QueueType) => {
                    queue_type.get_or_insert(idx);
                }
                // First occurrence of a duplicated header wins
                Some(field) if !fields.iter().any(|(_, f)| *f == field) => {
                    fields.push((idx, field));
                }
                _ => {}
            }
        }

        Self { queue_type, fields }
    }

    fn contains(&self, field: Field) -> bool {
        match field {
            Field::QueueType => self.queue_type.is_some(),
            other => self.fields.iter().any(|(_, f)| *f == other),
        }
    }

    fn convert(&self, row: &csv::StringRecord, line: u64, path: &Path) -> Result<Record> {
        let queue_type = self
            .queue_type
            .and_then(|idx| row.get(idx))
            .filter(|cell| !cell.is_empty())
            .ok_or_else(|| PlotError::parse(path, format!("line {line}: empty {QUEUE_TYPE}")))?;

        let mut record = Record::new(queue_type);
        for &(idx, field) in &self.fields {
            let cell = match row.get(idx) {
                Some(cell) if !cell.is_empty() => cell,
                _ => continue,
            };
            match field {
                Field::QueueType => {}
                Field::TestId => record.test_id = Some(cell.to_string()),
                Field::Independent(var) => {
                    let value = parse_count(cell).ok_or_else(|| {
                        PlotError::parse(
                            path,
                            format!(
                                "line {line}: '{cell}' in column '{}' is not an integer",
                                var.column_name()
                            ),
                        )
                    })?;
                    record.set_independent(var, Some(value));
                }
                Field::Metric(metric) => {
                    let value = cell.parse::<f64>().map_err(|_| {
                        PlotError::parse(
                            path,
                            format!(
                                "line {line}: '{cell}' in column '{}' is not numeric",
                                metric.column_name()
                            ),
                        )
                    })?;
                    record.set_metric(metric, Some(value));
                }
            }
        }

        Ok(record)
    }
}

/// Integer cell, also accepting integral floats such as `"6.0"`.
fn parse_count(cell: &str) -> Option<i64> {
    if let Ok(v) = cell.parse::<i64>() {
        return Some(v);
    }
    let v = cell.parse::<f64>().ok()?;
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

fn csv_error(path: &Path, err: csv::Error) -> PlotError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => PlotError::io(path, source),
        _ => PlotError::parse(path, message),
    }
}
