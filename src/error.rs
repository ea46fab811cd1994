use thiserror::Error;

/// A source table could not be loaded. Fatal at startup: either all five
/// tables load or the dashboard does not render.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("table file not found: {path}")]
    Missing { path: String },

    #[error("cannot read {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("header mismatch in {table}: expected {expected:?}, got {got:?}")]
    HeaderMismatch {
        table: String,
        expected: Vec<String>,
        got: Vec<String>,
    },

    #[error("failed to populate table {table}: {source}")]
    Insert {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("engine initialization failed: {source}")]
    Engine {
        #[source]
        source: rusqlite::Error,
    },
}

/// The engine rejected a report query. A malformed template is a programming
/// defect, not a transient fault, so the offending SQL is carried for
/// diagnosis and there are no retries.
#[derive(Debug, Error)]
#[error("query failed: {source}\n--- sql ---\n{sql}")]
pub struct QueryError {
    pub sql: String,
    #[source]
    pub source: rusqlite::Error,
}

impl QueryError {
    pub fn new(sql: &str, source: rusqlite::Error) -> Self {
        Self { sql: sql.to_string(), source }
    }
}
