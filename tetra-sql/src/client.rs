use std::sync::Arc;

use tetra_core::{Client, RepositoryError, RepositoryResult};
use tetra_model::Record;
use tetra_types::Value;
use tracing::{debug, error};

use crate::{Dialect, DriverError, ExecResult, SqlDb};

/// Query and exec support over a shared database handle.
#[derive(Clone)]
pub struct SqlClient {
    db: Arc<dyn SqlDb>,
}

impl SqlClient {
    #[must_use]
    pub fn new(db: Arc<dyn SqlDb>) -> Self {
        Self { db }
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.db.dialect()
    }

    /// The underlying handle, shared with the pool.
    #[must_use]
    pub fn db(&self) -> &Arc<dyn SqlDb> {
        &self.db
    }

    /// Runs a query expected to match one row. No row is `NotFound`.
    pub fn query_one(&self, sql: &str, args: &[Value]) -> RepositoryResult<Record> {
        if sql.trim().is_empty() {
            return Err(RepositoryError::InvalidStatement("empty read query".into()));
        }
        if args.is_empty() {
            return Err(RepositoryError::InvalidStatement("empty read parameters".into()));
        }
        self.query(sql, args)?
            .into_iter()
            .next()
            .ok_or(RepositoryError::NotFound)
    }

    pub fn query(&self, sql: &str, args: &[Value]) -> RepositoryResult<Vec<Record>> {
        if sql.trim().is_empty() {
            return Err(RepositoryError::InvalidStatement("empty read query".into()));
        }
        let rows = self
            .db
            .query(sql, args)
            .map_err(|e| failed(sql, args, e))?;
        debug!("Query returned {} rows: {} {}", rows.len(), sql, describe(args));
        Ok(rows.into_records())
    }

    pub fn exec(&self, sql: &str, args: &[Value]) -> RepositoryResult<ExecResult> {
        if sql.trim().is_empty() {
            return Err(RepositoryError::InvalidStatement("empty exec statement".into()));
        }
        if args.is_empty() {
            return Err(RepositoryError::InvalidStatement("empty exec parameters".into()));
        }
        let result = self.db.exec(sql, args).map_err(|e| failed(sql, args, e))?;
        debug!(
            "Executed statement (rows_affected={}): {} {}",
            result.rows_affected,
            sql,
            describe(args)
        );
        Ok(result)
    }

    /// Runs parameterless DDL or maintenance statements.
    pub fn exec_script(&self, sql: &str) -> RepositoryResult<()> {
        self.db
            .execute_batch(sql)
            .map_err(|e| failed(sql, &[], e))
    }
}

impl Client for SqlClient {
    fn close(&self) -> RepositoryResult<()> {
        debug!("Released sql client");
        Ok(())
    }
}

fn failed(sql: &str, args: &[Value], err: DriverError) -> RepositoryError {
    error!("Statement failed: {} {}: {}", sql, describe(args), err);
    RepositoryError::backend(format!("{sql} {}", describe(args)), err)
}

pub(crate) fn describe(args: &[Value]) -> String {
    let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
    format!("[{}]", rendered.join(", "))
}
