// ============================================================
// Layer 4 — Note Series Loader
// ============================================================
// Reads encoded note files (comma-separated numeric text).
//
// File format:
//   line 0  = header, e.g. "time,pitch,velocity"
//   line 1+ = "0.01,64,0.8"  → label column, then features
//
// Parsing rules:
//   - The header is stored verbatim
//   - Feature width = header field count - 1
//   - Trailing empty fields ("0,1,2,") are not counted
//   - A data row is kept only if EVERY feature field parses as
//     a number and the row has exactly feature-width features.
//     Anything else is dropped silently (counted in the log).
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use csv::{ReaderBuilder, StringRecord};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::data::error::{SamplerError, SamplerResult};
use crate::domain::series::{Row, Series};

/// Expand a list of input paths into concrete source files.
///
/// Directories contribute every `.csv` file directly inside them,
/// sorted by file name. Anything else is passed through unchanged
/// so a missing file is reported later by the sampler.
pub fn discover_sources<P: AsRef<Path>>(inputs: &[P]) -> SamplerResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        let path = input.as_ref();
        if !path.is_dir() {
            files.push(path.to_path_buf());
            continue;
        }

        let entries = fs::read_dir(path).map_err(|source| SamplerError::SourceReadFailure {
            path: path.to_path_buf(),
            source,
        })?;

        let mut found: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| SamplerError::SourceReadFailure {
                path: path.to_path_buf(),
                source,
            })?;
            let child = entry.path();
            if child.is_file() && child.extension().and_then(|e| e.to_str()) == Some("csv") {
                found.push(child);
            }
        }
        found.sort();

        tracing::debug!("Found {} csv files in '{}'", found.len(), path.display());
        files.extend(found);
    }

    Ok(files)
}

/// Load one source file into a Series.
pub fn parse_series(path: &Path) -> SamplerResult<Series> {
    let read_failure = |source| SamplerError::SourceReadFailure {
        path: path.to_path_buf(),
        source,
    };
    // csv::Error carries the underlying io::Error when there is one
    let csv_failure = |err: csv::Error| read_failure(io::Error::from(err));

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(csv_failure)?;
    let mut records = reader.records();

    let header = match records.next() {
        Some(record) => record.map_err(csv_failure)?,
        None => {
            return Err(read_failure(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "file has no header line",
            )))
        }
    };
    let feature_width = significant_fields(&header).len().saturating_sub(1);
    let header = header.iter().collect::<Vec<_>>().join(",");

    let mut rows    = Vec::new();
    let mut dropped = 0usize;
    for record in records {
        let record = record.map_err(csv_failure)?;
        match parse_row(&record, feature_width) {
            Some(row) => rows.push(row),
            None      => dropped += 1,
        }
    }

    if dropped > 0 {
        tracing::debug!("Dropped {} malformed rows from '{}'", dropped, path.display());
    }

    Ok(Series::new(header, feature_width, rows))
}

/// Fields of a record with trailing empty fields removed,
/// so "0,1,2," has the same three fields as "0,1,2".
fn significant_fields(record: &StringRecord) -> Vec<&str> {
    let mut fields: Vec<&str> = record.iter().collect();
    while fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }
    fields
}

/// Parse the feature fields of one record (the label column is skipped).
/// Returns None if the record is malformed.
fn parse_row(record: &StringRecord, feature_width: usize) -> Option<Row> {
    let row = significant_fields(record)
        .into_iter()
        .skip(1)
        .map(|field| field.trim().parse::<f64>().ok())
        .collect::<Option<Row>>()?;

    (row.len() == feature_width).then_some(row)
}
