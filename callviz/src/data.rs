// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CSV loading for `(reason, Count)` tables.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use callviz_transforms::{ReasonTable, Record};
use csv::ReaderBuilder;
use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;

/// Header of the category column.
pub(crate) const REASON_COLUMN: &str = "reason";
/// Header of the count column.
pub(crate) const COUNT_COLUMN: &str = "Count";

/// Errors raised while loading the dataset.
#[derive(Debug, Error)]
pub(crate) enum LoadError {
    /// The file could not be opened or read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV was malformed.
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A required header is absent.
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),
}

#[derive(Debug, Deserialize)]
struct RawRow {
    reason: String,
    #[serde(rename = "Count")]
    count: String,
}

/// Loads the table at `path`.
pub(crate) fn load_records(path: &Path) -> Result<ReasonTable, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parse_records(file)?;
    debug!("loaded {} rows from {}", table.row_count(), path.display());
    Ok(table)
}

/// Parses a headed CSV with `reason` and `Count` columns. Other columns are ignored.
///
/// Counts are coerced the way a JavaScript unary `+` would: surrounding whitespace is ignored,
/// an empty cell is `0`, and anything non-numeric becomes `NaN` (with a warning).
pub(crate) fn parse_records(reader: impl Read) -> Result<ReasonTable, LoadError> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    for column in [REASON_COLUMN, COUNT_COLUMN] {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn(column));
        }
    }

    let mut rows = Vec::new();
    for (i, row) in rdr.deserialize::<RawRow>().enumerate() {
        let row = row?;
        let count = coerce_count(&row.count);
        if count.is_nan() {
            // Header is line 1.
            warn!(
                "line {}: count {:?} for {:?} is not a number",
                i + 2,
                row.count,
                row.reason
            );
        }
        rows.push(Record::new(row.reason, count));
    }
    Ok(ReasonTable::new(rows))
}

/// Numeric coercion matching JavaScript's unary `+` on strings.
pub(crate) fn coerce_count(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    let (sign, unsigned) = match s.as_bytes()[0] {
        b'-' => (-1.0, &s[1..]),
        b'+' => (1.0, &s[1..]),
        _ => (1.0, s),
    };
    if unsigned == "Infinity" {
        return sign * f64::INFINITY;
    }
    // Prefixed integers are only accepted unsigned.
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix).map_or(f64::NAN, |v| v as f64);
        }
    }
    // Rust also accepts "inf" and "nan", which JavaScript does not.
    let plain = unsigned
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !plain || !unsigned.bytes().any(|b| b.is_ascii_digit()) {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn coercion_follows_unary_plus() {
        assert_eq!(coerce_count("48213"), 48_213.0);
        assert_eq!(coerce_count("  12 "), 12.0);
        assert_eq!(coerce_count(""), 0.0);
        assert_eq!(coerce_count("   "), 0.0);
        assert_eq!(coerce_count("1e3"), 1000.0);
        assert_eq!(coerce_count(".5"), 0.5);
        assert_eq!(coerce_count("-7"), -7.0);
        assert_eq!(coerce_count("0x10"), 16.0);
        assert_eq!(coerce_count("Infinity"), f64::INFINITY);
        assert!(coerce_count("1,234").is_nan());
        assert!(coerce_count("abc").is_nan());
        assert!(coerce_count("inf").is_nan());
        assert!(coerce_count("NaN").is_nan());
        assert!(coerce_count("-0x10").is_nan());
    }

    #[test]
    fn parses_required_columns_and_ignores_extras() {
        let csv = "type,reason,Count\nx,Street Lights,950\ny,Sanitation,\"1200\"\nz,Other,n/a\n";
        let table = match parse_records(csv.as_bytes()) {
            Ok(t) => t,
            Err(e) => panic!("parse failed: {e}"),
        };
        assert_eq!(
            table.reasons().collect::<Vec<_>>(),
            ["Street Lights", "Sanitation", "Other"]
        );
        assert_eq!(table.rows[1].count, 1200.0);
        assert!(table.rows[2].count.is_nan());
    }

    #[test]
    fn missing_count_column_is_reported() {
        let err = parse_records("reason,total\nA,1\n".as_bytes());
        assert!(matches!(err, Err(LoadError::MissingColumn("Count"))));
    }

    #[test]
    fn header_only_file_is_an_empty_table() {
        let table = parse_records("reason,Count\n".as_bytes());
        assert!(table.is_ok_and(|t| t.is_empty()));
    }

    #[test]
    fn loads_from_disk_and_reports_missing_files() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "reason,Count").expect("write header");
        writeln!(file, "Needle Pickup,75").expect("write row");
        let table = load_records(file.path()).expect("load temp csv");
        assert_eq!(table.row_count(), 1);

        let dir = tempfile::tempdir().expect("create temp dir");
        let missing = dir.path().join("missing.csv");
        assert!(matches!(load_records(&missing), Err(LoadError::Io { .. })));
    }
}
