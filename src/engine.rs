//! Embedded analytical query engine.
//!
//! Wraps a `rusqlite` connection over the in-memory tables. Execution is
//! synchronous and deterministic: every report query carries an explicit
//! ORDER BY, and a rejected statement surfaces immediately as a
//! [`QueryError`] with the offending SQL attached.
//!
//! SQLite has window functions (DENSE_RANK) and date-part extraction via
//! `strftime`, but no standard-deviation aggregate; a sample-stddev
//! `stddev(x)` is registered here (Welford accumulation, NULL for n < 2).

use rusqlite::functions::{Aggregate, Context, FunctionFlags};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, ToSql};

use crate::error::QueryError;
use crate::logging::{log, obj, v_num, Domain, Level};

/// A materialized query result: column names plus owned row values.
#[derive(Debug, Clone)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn col(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Numeric view of a cell; integers widen to f64, NULL and text are None.
    pub fn f64_at(&self, row: usize, col: usize) -> Option<f64> {
        match self.rows.get(row)?.get(col)? {
            SqlValue::Integer(i) => Some(*i as f64),
            SqlValue::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn i64_at(&self, row: usize, col: usize) -> Option<i64> {
        match self.rows.get(row)?.get(col)? {
            SqlValue::Integer(i) => Some(*i),
            SqlValue::Real(r) => Some(*r as i64),
            _ => None,
        }
    }

    pub fn str_at(&self, row: usize, col: usize) -> Option<&str> {
        match self.rows.get(row)?.get(col)? {
            SqlValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Sum of a numeric column, NULLs skipped.
    pub fn sum_f64(&self, col: usize) -> f64 {
        (0..self.rows.len()).filter_map(|r| self.f64_at(r, col)).sum()
    }
}

pub struct QueryEngine {
    conn: Connection,
}

impl QueryEngine {
    pub fn new(conn: Connection) -> Result<Self, rusqlite::Error> {
        conn.create_aggregate_function(
            "stddev",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            SampleStddev,
        )?;
        Ok(Self { conn })
    }

    /// Run one statement with named parameters, materializing all rows.
    pub fn execute(
        &self,
        sql: &str,
        params: &[(&str, &dyn ToSql)],
    ) -> Result<Table, QueryError> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| QueryError::new(sql, e))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let ncols = columns.len();

        let mut rows = Vec::new();
        let mut raw = stmt.query(params).map_err(|e| QueryError::new(sql, e))?;
        while let Some(row) = raw.next().map_err(|e| QueryError::new(sql, e))? {
            let mut out = Vec::with_capacity(ncols);
            for i in 0..ncols {
                let v: SqlValue = row.get(i).map_err(|e| QueryError::new(sql, e))?;
                out.push(v);
            }
            rows.push(out);
        }
        log(
            Level::Trace,
            Domain::Query,
            "query_executed",
            obj(&[
                ("rows", v_num(rows.len() as f64)),
                ("cols", v_num(ncols as f64)),
            ]),
        );
        Ok(Table { columns, rows })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

struct SampleStddev;

#[derive(Default)]
struct StddevAcc {
    n: u64,
    mean: f64,
    m2: f64,
}

impl Aggregate<StddevAcc, Option<f64>> for SampleStddev {
    fn init(&self, _ctx: &mut Context<'_>) -> rusqlite::Result<StddevAcc> {
        Ok(StddevAcc::default())
    }

    fn step(&self, ctx: &mut Context<'_>, acc: &mut StddevAcc) -> rusqlite::Result<()> {
        if let Some(x) = ctx.get::<Option<f64>>(0)? {
            acc.n += 1;
            let delta = x - acc.mean;
            acc.mean += delta / acc.n as f64;
            acc.m2 += delta * (x - acc.mean);
        }
        Ok(())
    }

    fn finalize(
        &self,
        _ctx: &mut Context<'_>,
        acc: Option<StddevAcc>,
    ) -> rusqlite::Result<Option<f64>> {
        Ok(acc.and_then(|a| {
            if a.n < 2 {
                None
            } else {
                Some((a.m2 / (a.n - 1) as f64).sqrt())
            }
        }))
    }
}
