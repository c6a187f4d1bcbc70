//! CSV reader for manually curated Q&A rows.
//!
//! The header must name exactly the five record columns. Any row that does
//! not line up with it aborts the whole read: rows are never padded,
//! truncated, or skipped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ErrorKind, ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info, instrument, warn};

use qamerge_shared::{Priority, QaMergeError, QaRecord, Result, TABULAR_COLUMNS};

/// Parsing options for the tabular input.
#[derive(Debug, Clone, Copy)]
pub struct TabularOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
}

impl Default for TabularOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Read and parse the tabular file at `path`.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_tabular(path: &Path, options: &TabularOptions) -> Result<Vec<QaRecord>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => QaMergeError::not_found(path),
        _ => QaMergeError::io(path, e),
    })?;

    let records = parse_tabular(file, path, options)?;

    if records.is_empty() {
        warn!("tabular input has a header but no rows");
    }
    info!(rows = records.len(), "loaded manual Q&A rows");

    Ok(records)
}

/// Parse tabular data from any reader. `origin` is only used in error messages.
pub fn parse_tabular<R: Read>(
    reader: R,
    origin: &Path,
    options: &TabularOptions,
) -> Result<Vec<QaRecord>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(false)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| csv_error(origin, &e))?
        .clone();
    check_header(&headers, origin)?;

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row.map_err(|e| csv_error(origin, &e))?;
        let line = row.position().map_or(0, |p| p.line());
        let record = row_to_record(&row, origin, line)?;
        debug!(line, question = %record.question, "parsed row");
        records.push(record);
    }

    Ok(records)
}

/// Ensure the header row names the expected columns in order.
fn check_header(headers: &StringRecord, origin: &Path) -> Result<()> {
    let found: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
            h.trim().to_ascii_lowercase()
        })
        .collect();

    if found.iter().map(String::as_str).eq(TABULAR_COLUMNS) {
        return Ok(());
    }

    Err(QaMergeError::malformed(
        origin,
        1,
        format!(
            "expected header '{}', found '{}'",
            TABULAR_COLUMNS.join(","),
            found.join(",")
        ),
    ))
}

/// Build a record from a row that already has the right column count.
fn row_to_record(row: &StringRecord, origin: &Path, line: u64) -> Result<QaRecord> {
    let field = |i: usize| row.get(i).unwrap_or_default().to_string();

    let question = field(0);
    let answer = field(1);
    if question.is_empty() {
        return Err(QaMergeError::malformed(origin, line, "empty question"));
    }
    if answer.is_empty() {
        return Err(QaMergeError::malformed(
            origin,
            line,
            format!("empty answer for question '{question}'"),
        ));
    }

    let priority: Priority = field(4)
        .parse()
        .map_err(|e| QaMergeError::malformed(origin, line, format!("{e}")))?;

    Ok(QaRecord {
        question,
        answer,
        category: field(2),
        source: field(3),
        priority,
    })
}

/// Translate a `csv` error into a malformed-input error with a line number.
fn csv_error(origin: &Path, err: &csv::Error) -> QaMergeError {
    let line = err.position().map_or(0, |p| p.line());
    let message = match err.kind() {
        ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {expected_len} fields, found {len}"),
        ErrorKind::Utf8 { .. } => "invalid UTF-8".to_string(),
        ErrorKind::Io(e) => format!("read failed: {e}"),
        _ => err.to_string(),
    };
    QaMergeError::malformed(origin, line, message)
}
