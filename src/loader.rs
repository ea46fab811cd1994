//! Table loader: reads the five source CSVs into an in-memory SQLite
//! database exactly once per pipeline lifetime.
//!
//! All-or-nothing contract: a missing file, unreadable content, or a header
//! that does not match the expected schema aborts the whole load with a
//! [`DataLoadError`]. There is no partial-success mode; the dashboard either
//! has all five tables or does not render.

use rusqlite::{params_from_iter, Connection};
use std::path::Path;

use crate::error::DataLoadError;
use crate::logging::{log, obj, ts_now, v_num, v_str, Domain, Level};
use crate::schema::{file_sha256, split_csv_line, validate_header, SourceTable, TableManifest};

/// Load every source table from `data_dir` into a fresh in-memory database.
/// Returns the populated connection and one manifest per table.
pub fn load_all(data_dir: &Path) -> Result<(Connection, Vec<TableManifest>), DataLoadError> {
    let conn = Connection::open_in_memory().map_err(|e| DataLoadError::Insert {
        table: "<init>".to_string(),
        source: e,
    })?;
    let mut manifests = Vec::with_capacity(SourceTable::ALL.len());
    for table in SourceTable::ALL {
        let manifest = load_one(&conn, table, &data_dir.join(table.file_name()))?;
        log(
            Level::Info,
            Domain::Data,
            "table_loaded",
            obj(&[
                ("table", v_str(&manifest.table)),
                ("rows", v_num(manifest.row_count as f64)),
                ("bad_rows", v_num(manifest.bad_rows as f64)),
                ("sha256", v_str(&manifest.hash_sha256)),
            ]),
        );
        manifests.push(manifest);
    }
    Ok((conn, manifests))
}

fn load_one(
    conn: &Connection,
    table: SourceTable,
    path: &Path,
) -> Result<TableManifest, DataLoadError> {
    let report = validate_header(table, path)?;
    if !report.ok {
        log(
            Level::Error,
            Domain::Data,
            "header_mismatch",
            obj(&[
                ("table", v_str(table.name())),
                ("detail", v_str(&report.message)),
                ("got", v_str(&report.columns.join(","))),
            ]),
        );
        return Err(DataLoadError::HeaderMismatch {
            table: table.name().to_string(),
            expected: report.expected,
            got: report.columns,
        });
    }

    let content = crate::schema::read_to_string(path)?;
    let hash = file_sha256(path)?;
    let ncols = table.expected_columns().len();

    conn.execute_batch(table.create_sql())
        .map_err(|e| DataLoadError::Insert { table: table.name().to_string(), source: e })?;

    let mut row_count = 0u64;
    let mut bad_rows = 0u64;
    let mut warnings = Vec::new();

    // Single transaction per table; prepared insert reused per row.
    conn.execute_batch("BEGIN")
        .map_err(|e| DataLoadError::Insert { table: table.name().to_string(), source: e })?;
    {
        let mut stmt = conn
            .prepare(&table.insert_sql())
            .map_err(|e| DataLoadError::Insert { table: table.name().to_string(), source: e })?;
        for line in content.lines().skip(1) {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let fields = split_csv_line(trimmed);
            if fields.len() != ncols {
                bad_rows += 1;
                warnings.push(format!(
                    "bad_row: expected {} fields, got {}",
                    ncols,
                    fields.len()
                ));
                continue;
            }
            // Empty cells become NULL; everything else binds as text and
            // lands through column affinity.
            let bound: Vec<Option<&str>> = fields
                .iter()
                .map(|f| if f.is_empty() { None } else { Some(f.as_str()) })
                .collect();
            stmt.execute(params_from_iter(bound.iter()))
                .map_err(|e| DataLoadError::Insert { table: table.name().to_string(), source: e })?;
            row_count += 1;
        }
    }
    conn.execute_batch("COMMIT")
        .map_err(|e| DataLoadError::Insert { table: table.name().to_string(), source: e })?;

    Ok(TableManifest {
        table: table.name().to_string(),
        path: path.display().to_string(),
        hash_sha256: hash,
        row_count,
        bad_rows,
        warnings,
        generated_at: ts_now(),
    })
}
