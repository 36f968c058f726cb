//! The native boundary of the SQL adapter.

use std::sync::Arc;

use tetra_model::Record;
use tetra_types::Value;
use thiserror::Error;

use crate::Dialect;

/// An error reported by a SQL driver, with the engine's error code when
/// there is one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DriverError {
    pub code: Option<String>,
    pub message: String,
}

impl DriverError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    pub(crate) fn closed() -> Self {
        Self::new("sql: database is closed")
    }
}

/// Outcome of a statement that returns no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    pub last_insert_id: Option<i64>,
}

/// A fully read result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rows {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Rows {
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Pairs every row with the column names.
    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|row| columns.iter().cloned().zip(row).collect())
            .collect()
    }
}

/// An open database handle. Implementations must be safe to share across
/// threads; the adapter adds no locking of its own.
pub trait SqlDb: Send + Sync {
    fn dialect(&self) -> Dialect;

    fn exec(&self, sql: &str, args: &[Value]) -> Result<ExecResult, DriverError>;

    fn query(&self, sql: &str, args: &[Value]) -> Result<Rows, DriverError>;

    /// Runs several `;`-separated statements without parameters.
    fn execute_batch(&self, sql: &str) -> Result<(), DriverError>;

    fn ping(&self) -> Result<(), DriverError>;

    fn close(&self) -> Result<(), DriverError>;

    fn is_closed(&self) -> bool;
}

/// Opens databases from a data source name.
pub trait Driver: Send + Sync {
    fn name(&self) -> &str;

    fn open(&self, dsn: &str) -> Result<Arc<dyn SqlDb>, DriverError>;
}
