use std::sync::Arc;

use chrono::{DateTime, Utc};
use tetra_core::{Client, Context, RepositoryError, RepositoryResult, Status};
use tetra_model::Record;
use tracing::{debug, error};

use crate::{Database, Key, KeySet, Mutation};

/// Mutation and read access over the pool's shared database handle.
#[derive(Clone)]
pub struct SpannerClient {
    db: Arc<dyn Database>,
}

impl SpannerClient {
    #[must_use]
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    #[must_use]
    pub fn database(&self) -> &Arc<dyn Database> {
        &self.db
    }

    /// Commits the mutations atomically and returns the commit timestamp.
    pub fn apply(&self, cx: &Context, mutations: Vec<Mutation>) -> RepositoryResult<DateTime<Utc>> {
        let count = mutations.len();
        let tables: Vec<String> = mutations.iter().map(|m| m.table().to_string()).collect();
        let committed = self
            .db
            .apply(cx, mutations)
            .map_err(|s| failed("apply", &tables.join(","), s))?;
        debug!("Applied {} mutations at {}", count, committed);
        Ok(committed)
    }

    /// The primary key columns of `table`.
    pub fn key_columns(&self, cx: &Context, table: &str) -> RepositoryResult<Vec<String>> {
        self.db
            .key_columns(cx, table)
            .map_err(|s| failed("key_columns", table, s))
    }

    /// A read-only transaction for a single read.
    #[must_use]
    pub fn single(&self) -> ReadOnlyTransaction {
        ReadOnlyTransaction {
            db: Arc::clone(&self.db),
        }
    }
}

impl Client for SpannerClient {
    /// The database handle belongs to the pool; nothing to release here.
    fn close(&self) -> RepositoryResult<()> {
        debug!("Released spanner client");
        Ok(())
    }
}

pub struct ReadOnlyTransaction {
    db: Arc<dyn Database>,
}

impl ReadOnlyTransaction {
    /// Reads one row. A missing row is `NotFound`.
    pub fn read_row(
        &self,
        cx: &Context,
        table: &str,
        key: &Key,
        columns: &[String],
    ) -> RepositoryResult<Record> {
        let row = self
            .db
            .read_row(cx, table, key, columns)
            .map_err(|s| failed("read_row", &format!("{table}{key}"), s))?;
        debug!("Read row {}{}", table, key);
        Ok(row)
    }

    pub fn read(
        &self,
        cx: &Context,
        table: &str,
        keys: &KeySet,
        columns: &[String],
    ) -> RepositoryResult<Vec<Record>> {
        let rows = self
            .db
            .read(cx, table, keys, columns)
            .map_err(|s| failed("read", table, s))?;
        debug!("Read {} rows from {}", rows.len(), table);
        Ok(rows)
    }
}

fn failed(op: &str, target: &str, status: Status) -> RepositoryError {
    if status.is_not_found() {
        debug!("Spanner {} {}: not found", op, target);
    } else {
        error!("Spanner {} failed on {}: {}", op, target, status);
    }
    status.into_repository_error(format!("spanner {op} {target}"))
}
