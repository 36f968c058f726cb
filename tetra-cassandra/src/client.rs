use std::sync::Arc;

use tetra_core::{Client, RepositoryError, RepositoryResult};
use tetra_model::Record;
use tetra_types::Value;
use tracing::{debug, error};

use crate::{Consistency, ConsistencyPolicy, CqlError, Query, Session};

/// Statement execution over the pool's shared session.
#[derive(Clone)]
pub struct CqlClient {
    session: Arc<dyn Session>,
    policy: ConsistencyPolicy,
}

impl CqlClient {
    #[must_use]
    pub fn new(session: Arc<dyn Session>, policy: ConsistencyPolicy) -> Self {
        Self { session, policy }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }

    #[must_use]
    pub fn policy(&self) -> ConsistencyPolicy {
        self.policy
    }

    /// Point read at the single-row consistency. No row is `NotFound`.
    pub fn query_one(&self, cql: &str, params: &[Value]) -> RepositoryResult<Record> {
        check(cql, params, "read")?;
        self.run(cql, params, self.policy.single_row)?
            .into_records()
            .into_iter()
            .next()
            .ok_or(RepositoryError::NotFound)
    }

    /// Range read at the multi-row consistency.
    pub fn query(&self, cql: &str, params: &[Value]) -> RepositoryResult<Vec<Record>> {
        check(cql, params, "read")?;
        Ok(self.run(cql, params, self.policy.multi_row)?.into_records())
    }

    pub fn exec(&self, cql: &str, params: &[Value]) -> RepositoryResult<()> {
        check(cql, params, "exec")?;
        self.run(cql, params, self.policy.write).map(|_| ())
    }

    fn run(
        &self,
        cql: &str,
        params: &[Value],
        consistency: Consistency,
    ) -> RepositoryResult<crate::Rows> {
        let query = Query::new(cql, params.to_vec(), consistency);
        let rows = self
            .session
            .execute(&query)
            .map_err(|e| failed(&query, e))?;
        debug!(
            "Executed cql at {} ({} rows): {} {}",
            consistency,
            rows.len(),
            cql,
            describe(params)
        );
        Ok(rows)
    }
}

impl Client for CqlClient {
    /// The session belongs to the pool; nothing to release here.
    fn close(&self) -> RepositoryResult<()> {
        debug!("Released cql client");
        Ok(())
    }
}

fn check(cql: &str, params: &[Value], what: &str) -> RepositoryResult<()> {
    if cql.trim().is_empty() {
        return Err(RepositoryError::InvalidStatement(format!("empty {what} statement")));
    }
    if params.is_empty() {
        return Err(RepositoryError::InvalidStatement(format!("empty {what} parameters")));
    }
    Ok(())
}

fn failed(query: &Query, err: CqlError) -> RepositoryError {
    error!(
        "Cql statement failed at {}: {} {}: {}",
        query.consistency,
        query.cql,
        describe(&query.params),
        err
    );
    RepositoryError::backend(format!("{} {}", query.cql, describe(&query.params)), err)
}

fn describe(params: &[Value]) -> String {
    let rendered: Vec<String> = params.iter().map(ToString::to_string).collect();
    format!("[{}]", rendered.join(", "))
}
