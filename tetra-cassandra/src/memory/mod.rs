//! In-process column-family engine.
//!
//! Tables are schemaless apart from their primary key: any column may be
//! written, and unset columns read back as `NULL`. Only the full primary
//! key addresses a row. Filtering on anything else needs
//! `ALLOW FILTERING`, as it does on a real cluster.

mod parser;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tetra_types::Value;
use tracing::debug;

use crate::{CassandraConfig, Cluster, Consistency, CqlError, CqlErrorKind, Query, Rows, Session};
use parser::{Operand, Statement, TableRef};

/// A statement as the engine received it.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedStatement {
    pub cql: String,
    pub params: Vec<Value>,
    pub consistency: Consistency,
}

type Row = BTreeMap<String, Value>;

#[derive(Debug, Default)]
struct Table {
    key: Vec<String>,
    rows: BTreeMap<String, Row>,
}

impl Table {
    fn row_id(&self, values: &BTreeMap<String, Value>) -> Result<String, CqlError> {
        let mut parts = Vec::with_capacity(self.key.len());
        for column in &self.key {
            match values.get(column) {
                None => {
                    return Err(CqlError::invalid(format!(
                        "Some partition key parts are missing: {column}"
                    )));
                }
                Some(Value::Null) => {
                    return Err(CqlError::invalid(format!(
                        "Invalid null value for partition key part {column}"
                    )));
                }
                Some(value) => parts.push(value.canonical_key()),
            }
        }
        Ok(parts.join("\u{1f}"))
    }

    fn is_point_lookup(&self, filters: &BTreeMap<String, Value>) -> bool {
        filters.len() == self.key.len() && self.key.iter().all(|c| filters.contains_key(c))
    }

    /// Key columns first, then every other column seen in any row.
    fn all_columns(&self) -> Vec<String> {
        let others: BTreeSet<&String> = self
            .rows
            .values()
            .flat_map(|row| row.keys())
            .filter(|c| !self.key.contains(c))
            .collect();
        self.key
            .iter()
            .cloned()
            .chain(others.into_iter().cloned())
            .collect()
    }
}

#[derive(Debug, Default)]
struct State {
    keyspaces: BTreeMap<String, BTreeMap<String, Table>>,
    log: Vec<LoggedStatement>,
}

/// A cluster of in-process keyspaces. Clones share the same data.
#[derive(Debug, Clone)]
pub struct MemoryCluster {
    hosts: Vec<String>,
    credentials: Option<(String, String)>,
    state: Arc<Mutex<State>>,
}

impl Default for MemoryCluster {
    fn default() -> Self {
        Self::new(["127.0.0.1"])
    }
}

impl MemoryCluster {
    /// A cluster reachable at `hosts`, without authentication.
    #[must_use]
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: hosts.into_iter().map(Into::into).collect(),
            credentials: None,
            state: Arc::default(),
        }
    }

    /// Requires these credentials from every session.
    #[must_use]
    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.credentials = Some((username.to_string(), password.to_string()));
        self
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create_keyspace(&self, name: &str) {
        self.state().keyspaces.entry(name.to_string()).or_default();
    }

    /// Creates (or replaces) a table whose primary key is `key`.
    pub fn create_table(&self, keyspace: &str, table: &str, key: &[&str]) -> Result<(), CqlError> {
        if key.is_empty() {
            return Err(CqlError::invalid(format!("table {table} needs a primary key")));
        }
        let mut state = self.state();
        let tables = state
            .keyspaces
            .get_mut(keyspace)
            .ok_or_else(|| CqlError::invalid(format!("Keyspace {keyspace} does not exist")))?;
        tables.insert(
            table.to_string(),
            Table {
                key: key.iter().map(|c| (*c).to_string()).collect(),
                rows: BTreeMap::new(),
            },
        );
        Ok(())
    }

    /// Number of rows in a table; zero when it does not exist.
    #[must_use]
    pub fn row_count(&self, keyspace: &str, table: &str) -> usize {
        self.state()
            .keyspaces
            .get(keyspace)
            .and_then(|tables| tables.get(table))
            .map_or(0, |t| t.rows.len())
    }

    /// Every statement executed by any session so far.
    #[must_use]
    pub fn statements(&self) -> Vec<LoggedStatement> {
        self.state().log.clone()
    }

    /// Opens a session on `keyspace` with default settings otherwise.
    pub fn connect(&self, keyspace: &str) -> Result<Arc<MemorySession>, CqlError> {
        let config = CassandraConfig {
            hosts: self.hosts.clone(),
            keyspace: keyspace.to_string(),
            username: self.credentials.as_ref().map(|c| c.0.clone()).unwrap_or_default(),
            password: self.credentials.as_ref().map(|c| c.1.clone()).unwrap_or_default(),
            ..CassandraConfig::default()
        };
        self.open(&config)
    }

    fn open(&self, config: &CassandraConfig) -> Result<Arc<MemorySession>, CqlError> {
        let reachable = config.hosts.iter().any(|h| {
            let host = h.rsplit_once(':').map_or(h.as_str(), |(host, _)| host);
            self.hosts.iter().any(|known| known == h || known == host)
        });
        if !reachable {
            return Err(CqlError::new(
                CqlErrorKind::Unavailable,
                format!("no hosts available in the pool: [{}]", config.hosts.join(", ")),
            ));
        }
        if let Some((username, password)) = &self.credentials {
            if *username != config.username || *password != config.password {
                return Err(CqlError::new(
                    CqlErrorKind::Authentication,
                    "Provided username and/or password are incorrect",
                ));
            }
        }
        let keyspace = if config.keyspace.is_empty() {
            None
        } else if self.state().keyspaces.contains_key(&config.keyspace) {
            Some(config.keyspace.clone())
        } else {
            return Err(CqlError::invalid(format!(
                "Keyspace '{}' does not exist",
                config.keyspace
            )));
        };
        debug!("Opened in-process cql session (keyspace={:?})", keyspace);
        Ok(Arc::new(MemorySession {
            state: Arc::clone(&self.state),
            keyspace,
            closed: AtomicBool::new(false),
        }))
    }
}

impl Cluster for MemoryCluster {
    fn create_session(&self, config: &CassandraConfig) -> Result<Arc<dyn Session>, CqlError> {
        let session: Arc<dyn Session> = self.open(config)?;
        Ok(session)
    }
}

/// A session on a [`MemoryCluster`].
#[derive(Debug)]
pub struct MemorySession {
    state: Arc<Mutex<State>>,
    keyspace: Option<String>,
    closed: AtomicBool,
}

impl Session for MemorySession {
    fn execute(&self, query: &Query) -> Result<Rows, CqlError> {
        if self.is_closed() {
            return Err(CqlError::new(CqlErrorKind::SessionClosed, "session has been closed"));
        }
        let statement = parser::parse(&query.cql)?;
        let expected = statement.markers();
        if expected != query.params.len() {
            return Err(CqlError::invalid(format!(
                "there were {expected} markers(?) in CQL but {} bound variables",
                query.params.len()
            )));
        }

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.log.push(LoggedStatement {
            cql: query.cql.clone(),
            params: query.params.clone(),
            consistency: query.consistency,
        });
        let mut params = query.params.iter().cloned();
        let mut bind = |operand: Operand| match operand {
            Operand::Marker => params.next().unwrap_or(Value::Null),
            Operand::Literal(value) => value,
        };

        match statement {
            Statement::Select {
                table,
                columns,
                filters,
                limit,
                allow_filtering,
            } => {
                let table = self.table(&mut state, &table)?;
                let filters: BTreeMap<String, Value> =
                    filters.into_iter().map(|(c, o)| (c, bind(o))).collect();
                select(table, columns, &filters, limit, allow_filtering)
            }
            Statement::Insert {
                table,
                columns,
                values,
            } => {
                let table = self.table(&mut state, &table)?;
                let mut row = Row::new();
                for (column, operand) in columns.into_iter().zip(values) {
                    if row.insert(column.clone(), bind(operand)).is_some() {
                        return Err(CqlError::invalid(format!(
                            "Multiple definitions found for column {column}"
                        )));
                    }
                }
                let id = table.row_id(&row)?;
                let stored = table.rows.entry(id).or_default();
                for (column, value) in row {
                    if value.is_null() {
                        stored.remove(&column);
                    } else {
                        stored.insert(column, value);
                    }
                }
                Ok(Rows::default())
            }
            Statement::Delete { table, filters } => {
                let table = self.table(&mut state, &table)?;
                let filters: BTreeMap<String, Value> =
                    filters.into_iter().map(|(c, o)| (c, bind(o))).collect();
                if let Some(column) = filters.keys().find(|c| !table.key.contains(c)) {
                    return Err(CqlError::invalid(format!(
                        "Non PRIMARY KEY columns found in where clause: {column}"
                    )));
                }
                let id = table.row_id(&filters)?;
                table.rows.remove(&id);
                Ok(Rows::default())
            }
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

impl MemorySession {
    fn table<'a>(&self, state: &'a mut State, table: &TableRef) -> Result<&'a mut Table, CqlError> {
        let keyspace = table
            .keyspace
            .as_ref()
            .or(self.keyspace.as_ref())
            .ok_or_else(|| {
                CqlError::invalid("No keyspace has been specified. USE a keyspace, or explicitly specify keyspace.tablename")
            })?;
        state
            .keyspaces
            .get_mut(keyspace)
            .ok_or_else(|| CqlError::invalid(format!("Keyspace {keyspace} does not exist")))?
            .get_mut(&table.name)
            .ok_or_else(|| {
                CqlError::invalid(format!("unconfigured table {}", table.name))
            })
    }
}

fn select(
    table: &Table,
    columns: Option<Vec<String>>,
    filters: &BTreeMap<String, Value>,
    limit: Option<usize>,
    allow_filtering: bool,
) -> Result<Rows, CqlError> {
    let matched: Vec<&Row> = if filters.is_empty() {
        table.rows.values().collect()
    } else if table.is_point_lookup(filters) {
        let id = table.row_id(filters)?;
        table.rows.get(&id).into_iter().collect()
    } else if allow_filtering {
        table
            .rows
            .values()
            .filter(|row| filters.iter().all(|(c, v)| row.get(c).unwrap_or(&Value::Null) == v))
            .collect()
    } else {
        return Err(CqlError::invalid(
            "Cannot execute this query as it might involve data filtering and thus may have \
             unpredictable performance. If you want to execute this query despite the \
             performance unpredictability, use ALLOW FILTERING",
        ));
    };

    let columns = columns.unwrap_or_else(|| table.all_columns());
    let rows = matched
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|row| {
            columns
                .iter()
                .map(|c| row.get(c).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect();
    Ok(Rows::new(columns, rows))
}
