//! The native boundary of the CQL adapter.

use std::fmt;
use std::sync::Arc;

use tetra_model::Record;
use tetra_types::Value;
use thiserror::Error;

use crate::{CassandraConfig, Consistency};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CqlErrorKind {
    Syntax,
    Invalid,
    Unavailable,
    Authentication,
    SessionClosed,
}

impl fmt::Display for CqlErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CqlErrorKind::Syntax => "syntax error",
            CqlErrorKind::Invalid => "invalid request",
            CqlErrorKind::Unavailable => "unavailable",
            CqlErrorKind::Authentication => "authentication failed",
            CqlErrorKind::SessionClosed => "session closed",
        };
        f.write_str(name)
    }
}

/// An error reported by the CQL driver or the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct CqlError {
    pub kind: CqlErrorKind,
    pub message: String,
}

impl CqlError {
    #[must_use]
    pub fn new(kind: CqlErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn syntax(message: impl Into<String>) -> Self {
        Self::new(CqlErrorKind::Syntax, message)
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::new(CqlErrorKind::Invalid, message)
    }
}

/// One statement with its bound values.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub cql: String,
    pub params: Vec<Value>,
    pub consistency: Consistency,
}

impl Query {
    #[must_use]
    pub fn new(cql: impl Into<String>, params: Vec<Value>, consistency: Consistency) -> Self {
        Self {
            cql: cql.into(),
            params,
            consistency,
        }
    }
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

    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|row| columns.iter().cloned().zip(row).collect())
            .collect()
    }
}

/// A connected session. Sessions are shared by every client of a pool and
/// must be safe for concurrent use.
pub trait Session: Send + Sync {
    fn execute(&self, query: &Query) -> Result<Rows, CqlError>;

    fn is_closed(&self) -> bool;

    fn close(&self);
}

/// Creates sessions from connection settings.
pub trait Cluster: Send + Sync {
    fn create_session(&self, config: &CassandraConfig) -> Result<Arc<dyn Session>, CqlError>;
}
