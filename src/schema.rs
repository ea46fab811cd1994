//! Source table schemas and CSV intake helpers.
//!
//! The five dashboard tables arrive as pre-cleaned CSV files with fixed
//! headers. This module knows those headers, splits CSV lines (quote-aware,
//! since account names may carry commas), and produces a per-file manifest
//! (content hash, row counts) for observability.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::DataLoadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTable {
    Accounts,
    Orders,
    Region,
    SalesReps,
    WebEvents,
}

impl SourceTable {
    pub const ALL: [SourceTable; 5] = [
        SourceTable::Accounts,
        SourceTable::Orders,
        SourceTable::Region,
        SourceTable::SalesReps,
        SourceTable::WebEvents,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SourceTable::Accounts => "accounts",
            SourceTable::Orders => "orders",
            SourceTable::Region => "region",
            SourceTable::SalesReps => "sales_reps",
            SourceTable::WebEvents => "web_events",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.csv", self.name())
    }

    pub fn expected_columns(&self) -> &'static [&'static str] {
        match self {
            SourceTable::Accounts => {
                &["id", "name", "website", "lat", "long", "primary_poc", "sales_rep_id"]
            }
            SourceTable::Orders => &[
                "id",
                "account_id",
                "occurred_at",
                "standard_qty",
                "gloss_qty",
                "poster_qty",
                "total",
                "standard_amt_usd",
                "gloss_amt_usd",
                "poster_amt_usd",
                "total_amt_usd",
            ],
            SourceTable::Region => &["id", "name"],
            SourceTable::SalesReps => &["id", "name", "region_id"],
            SourceTable::WebEvents => &["id", "account_id", "occurred_at", "channel"],
        }
    }

    /// DDL for the in-memory mirror of this table. Column affinities matter:
    /// numeric CSV fields must land with INTEGER/REAL affinity so aggregate
    /// arithmetic behaves numerically.
    pub fn create_sql(&self) -> &'static str {
        match self {
            SourceTable::Accounts => {
                "CREATE TABLE accounts (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    website TEXT,
                    lat REAL,
                    long REAL,
                    primary_poc TEXT,
                    sales_rep_id INTEGER
                )"
            }
            SourceTable::Orders => {
                "CREATE TABLE orders (
                    id INTEGER PRIMARY KEY,
                    account_id INTEGER,
                    occurred_at TEXT,
                    standard_qty INTEGER,
                    gloss_qty INTEGER,
                    poster_qty INTEGER,
                    total INTEGER,
                    standard_amt_usd REAL,
                    gloss_amt_usd REAL,
                    poster_amt_usd REAL,
                    total_amt_usd REAL
                )"
            }
            SourceTable::Region => {
                "CREATE TABLE region (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL
                )"
            }
            SourceTable::SalesReps => {
                "CREATE TABLE sales_reps (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    region_id INTEGER
                )"
            }
            SourceTable::WebEvents => {
                "CREATE TABLE web_events (
                    id INTEGER PRIMARY KEY,
                    account_id INTEGER,
                    occurred_at TEXT,
                    channel TEXT
                )"
            }
        }
    }

    pub fn insert_sql(&self) -> String {
        let cols = self.expected_columns();
        let placeholders: Vec<String> = (1..=cols.len()).map(|i| format!("?{}", i)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name(),
            cols.join(", "),
            placeholders.join(", ")
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableManifest {
    pub table: String,
    pub path: String,
    pub hash_sha256: String,
    pub row_count: u64,
    pub bad_rows: u64,
    pub warnings: Vec<String>,
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaReport {
    pub columns: Vec<String>,
    pub expected: Vec<String>,
    pub ok: bool,
    pub message: String,
}

/// Split one CSV line into fields. Handles double-quoted fields containing
/// commas and doubled-quote escapes; no multi-line fields (the source data
/// has none).
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
            }
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

pub fn read_header(path: &Path) -> Result<Vec<String>, DataLoadError> {
    let content = read_to_string(path)?;
    let first = content.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    Ok(split_csv_line(first.trim())
        .into_iter()
        .map(|s| s.trim().to_string())
        .collect())
}

pub fn validate_header(table: SourceTable, path: &Path) -> Result<SchemaReport, DataLoadError> {
    let columns = read_header(path)?;
    let expected: Vec<String> = table
        .expected_columns()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let ok = columns == expected;
    let message = if ok {
        "ok".to_string()
    } else {
        format!("{}: header does not match expected schema", table.name())
    };
    Ok(SchemaReport { columns, expected, ok, message })
}

pub fn read_to_string(path: &Path) -> Result<String, DataLoadError> {
    if !path.exists() {
        return Err(DataLoadError::Missing { path: path.display().to_string() });
    }
    std::fs::read_to_string(path).map_err(|e| DataLoadError::Unreadable {
        path: path.display().to_string(),
        source: e,
    })
}

/// Inspect one CSV without loading it: header check plus row counting,
/// producing the same manifest shape the loader emits.
pub fn analyze_csv(table: SourceTable, path: &Path) -> Result<TableManifest, DataLoadError> {
    let report = validate_header(table, path)?;
    if !report.ok {
        return Err(DataLoadError::HeaderMismatch {
            table: table.name().to_string(),
            expected: report.expected,
            got: report.columns,
        });
    }
    let content = read_to_string(path)?;
    let hash = file_sha256(path)?;
    let ncols = table.expected_columns().len();
    let mut row_count = 0u64;
    let mut bad_rows = 0u64;
    let mut warnings = Vec::new();
    for line in content.lines().skip(1) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let fields = split_csv_line(trimmed);
        if fields.len() == ncols {
            row_count += 1;
        } else {
            bad_rows += 1;
            warnings.push(format!("bad_row: expected {} fields, got {}", ncols, fields.len()));
        }
    }
    Ok(TableManifest {
        table: table.name().to_string(),
        path: path.display().to_string(),
        hash_sha256: hash,
        row_count,
        bad_rows,
        warnings,
        generated_at: crate::logging::ts_now(),
    })
}

pub fn default_manifest_path(path: &Path) -> std::path::PathBuf {
    let mut out = path.as_os_str().to_owned();
    out.push(".manifest.json");
    std::path::PathBuf::from(out)
}

pub fn table_for_file(stem: &str) -> Option<SourceTable> {
    SourceTable::ALL.into_iter().find(|t| t.name() == stem)
}

pub fn file_sha256(path: &Path) -> Result<String, DataLoadError> {
    let mut file = File::open(path).map_err(|e| DataLoadError::Unreadable {
        path: path.display().to_string(),
        source: e,
    })?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf).map_err(|e| DataLoadError::Unreadable {
            path: path.display().to_string(),
            source: e,
        })?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_plain_fields() {
        assert_eq!(split_csv_line("1,Walmart,3"), vec!["1", "Walmart", "3"]);
    }

    #[test]
    fn split_quoted_comma() {
        assert_eq!(
            split_csv_line(r#"1,"Smith, Jones & Co",3"#),
            vec!["1", "Smith, Jones & Co", "3"]
        );
    }

    #[test]
    fn split_doubled_quote_escape() {
        assert_eq!(split_csv_line(r#"1,"say ""hi""""#), vec!["1", r#"say "hi""#]);
    }

    #[test]
    fn split_trailing_empty_field() {
        assert_eq!(split_csv_line("a,b,"), vec!["a", "b", ""]);
    }

    #[test]
    fn header_report_message_names_mismatched_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("region.csv");
        std::fs::write(&path, "id,label\n1,Northeast\n").unwrap();
        let report = validate_header(SourceTable::Region, &path).unwrap();
        assert!(!report.ok);
        assert!(report.message.contains("region"), "got: {}", report.message);

        std::fs::write(&path, "id,name\n1,Northeast\n").unwrap();
        let report = validate_header(SourceTable::Region, &path).unwrap();
        assert!(report.ok);
        assert_eq!(report.message, "ok");
    }

    #[test]
    fn insert_sql_matches_column_count() {
        for table in SourceTable::ALL {
            let sql = table.insert_sql();
            let n = table.expected_columns().len();
            assert!(sql.contains(&format!("?{}", n)));
            assert!(!sql.contains(&format!("?{}", n + 1)));
        }
    }
}
