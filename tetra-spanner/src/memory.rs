//! In-process mutation database.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use tetra_core::{Context, Status};
use tetra_model::Record;
use tetra_types::Value;

use crate::{Connector, Database, Key, KeySet, Mutation, MutationOp, SpannerConfig};

type Row = BTreeMap<String, Value>;

#[derive(Debug, Clone)]
struct Table {
    key: Vec<String>,
    columns: Vec<String>,
    rows: BTreeMap<String, (Vec<Value>, Row)>,
}

impl Table {
    fn check_columns(&self, table: &str, columns: &[String]) -> Result<(), Status> {
        match columns.iter().find(|c| !self.columns.contains(*c)) {
            Some(column) => Err(Status::invalid_argument(format!(
                "column not found in table {table}: {column}"
            ))),
            None => Ok(()),
        }
    }

    fn row_id(&self, table: &str, key: &[Value]) -> Result<String, Status> {
        if key.len() != self.key.len() {
            return Err(Status::invalid_argument(format!(
                "table {table} has {} key columns, got a key of {}",
                self.key.len(),
                key.len()
            )));
        }
        let parts: Vec<String> = key.iter().map(Value::canonical_key).collect();
        Ok(parts.join("\u{1f}"))
    }

    fn project(&self, row: &Row, columns: &[String]) -> Record {
        columns
            .iter()
            .map(|c| (c.clone(), row.get(c).cloned().unwrap_or(Value::Null)))
            .collect()
    }

    fn write(&mut self, table: &str, mutation: Mutation) -> Result<(), Status> {
        let op = mutation.op();
        if mutation.columns().len() != mutation.values().len() {
            return Err(Status::invalid_argument(format!(
                "mutation on {table} has {} columns but {} values",
                mutation.columns().len(),
                mutation.values().len()
            )));
        }
        self.check_columns(table, mutation.columns())?;
        let written: Row = mutation
            .columns()
            .iter()
            .cloned()
            .zip(mutation.values().iter().cloned())
            .collect();
        let mut key = Vec::with_capacity(self.key.len());
        for column in &self.key {
            match written.get(column) {
                Some(value) if !value.is_null() => key.push(value.clone()),
                _ => {
                    return Err(Status::invalid_argument(format!(
                        "mutation on {table} is missing key column {column}"
                    )));
                }
            }
        }
        let id = self.row_id(table, &key)?;
        let shown = Key::new(key.clone());

        let exists = self.rows.contains_key(&id);
        match op {
            MutationOp::Insert if exists => Err(Status::already_exists(format!(
                "row {shown} in table {table} already exists"
            ))),
            MutationOp::Update if !exists => Err(Status::not_found(format!(
                "row {shown} in table {table} not found"
            ))),
            MutationOp::Update | MutationOp::InsertOrUpdate if exists => {
                if let Some((_, row)) = self.rows.get_mut(&id) {
                    row.extend(written);
                }
                Ok(())
            }
            _ => {
                self.rows.insert(id, (key, written));
                Ok(())
            }
        }
    }

    fn delete(&mut self, table: &str, keys: &KeySet) -> Result<(), Status> {
        match keys {
            KeySet::All => self.rows.clear(),
            KeySet::Keys(keys) => {
                for key in keys {
                    let id = self.row_id(table, key.parts())?;
                    self.rows.remove(&id);
                }
            }
        }
        Ok(())
    }

    /// Rows in primary key order.
    fn sorted_rows(&self) -> Vec<&(Vec<Value>, Row)> {
        let mut rows: Vec<_> = self.rows.values().collect();
        rows.sort_by(|(a, _), (b, _)| key_cmp(a, b));
        rows
    }
}

fn key_cmp(a: &[Value], b: &[Value]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.query_cmp(y).unwrap_or(Ordering::Equal))
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

#[derive(Debug, Default)]
struct State {
    tables: BTreeMap<String, Table>,
    last_commit: Option<DateTime<Utc>>,
}

impl State {
    fn table(&self, name: &str) -> Result<&Table, Status> {
        self.tables
            .get(name)
            .ok_or_else(|| Status::invalid_argument(format!("table not found: {name}")))
    }

    fn next_commit_time(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let time = match self.last_commit {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_commit = Some(time);
        time
    }
}

#[derive(Debug)]
struct Inner {
    database_path: String,
    state: Mutex<State>,
    closed: AtomicBool,
}

/// A database held in memory. Tables must be created before use; clones
/// share data and the closed flag.
#[derive(Debug, Clone)]
pub struct MemorySpanner {
    inner: Arc<Inner>,
}

impl MemorySpanner {
    #[must_use]
    pub fn new(database_path: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                database_path: database_path.into(),
                state: Mutex::default(),
                closed: AtomicBool::new(false),
            }),
        }
    }

    #[must_use]
    pub fn database_path(&self) -> &str {
        &self.inner.database_path
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Declares a table. `key` columns must also appear in `columns`.
    pub fn create_table(&self, name: &str, key: &[&str], columns: &[&str]) -> Result<(), Status> {
        if key.is_empty() {
            return Err(Status::invalid_argument(format!("table {name} needs a primary key")));
        }
        if let Some(missing) = key.iter().find(|k| !columns.contains(*k)) {
            return Err(Status::invalid_argument(format!(
                "key column {missing} is not a column of {name}"
            )));
        }
        let mut state = self.state();
        if state.tables.contains_key(name) {
            return Err(Status::already_exists(format!("table {name} already exists")));
        }
        state.tables.insert(
            name.to_string(),
            Table {
                key: key.iter().map(|c| (*c).to_string()).collect(),
                columns: columns.iter().map(|c| (*c).to_string()).collect(),
                rows: BTreeMap::new(),
            },
        );
        Ok(())
    }

    /// Number of rows in a table; zero when it does not exist.
    #[must_use]
    pub fn row_count(&self, table: &str) -> usize {
        self.state().tables.get(table).map_or(0, |t| t.rows.len())
    }

    fn ready(&self, cx: &Context) -> Result<(), Status> {
        if self.is_closed() {
            return Err(Status::failed_precondition("client is closed"));
        }
        cx.check()
    }
}

impl Connector for MemorySpanner {
    fn connect(&self, config: &SpannerConfig) -> Result<Arc<dyn Database>, Status> {
        let path = config.database_path();
        if path != self.inner.database_path {
            return Err(Status::not_found(format!("database not found: {path}")));
        }
        if self.is_closed() {
            return Err(Status::failed_precondition("client is closed"));
        }
        Ok(Arc::new(self.clone()))
    }
}

impl Database for MemorySpanner {
    fn apply(&self, cx: &Context, mutations: Vec<Mutation>) -> Result<DateTime<Utc>, Status> {
        self.ready(cx)?;
        let mut state = self.state();
        // Touched tables are staged as copies and swapped in only if every
        // mutation succeeds.
        let mut staged: BTreeMap<String, Table> = BTreeMap::new();
        for mutation in mutations {
            let name = mutation.table().to_string();
            let table = match staged.entry(name.clone()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => entry.insert(state.table(&name)?.clone()),
            };
            if mutation.op() == MutationOp::Delete {
                table.delete(&name, mutation.key_set())?;
            } else {
                table.write(&name, mutation)?;
            }
        }
        state.tables.extend(staged);
        Ok(state.next_commit_time())
    }

    fn read_row(
        &self,
        cx: &Context,
        table: &str,
        key: &Key,
        columns: &[String],
    ) -> Result<Record, Status> {
        self.ready(cx)?;
        let state = self.state();
        let t = state.table(table)?;
        t.check_columns(table, columns)?;
        let id = t.row_id(table, key.parts())?;
        t.rows
            .get(&id)
            .map(|(_, row)| t.project(row, columns))
            .ok_or_else(|| Status::not_found(format!("row {key} in table {table} not found")))
    }

    fn read(
        &self,
        cx: &Context,
        table: &str,
        keys: &KeySet,
        columns: &[String],
    ) -> Result<Vec<Record>, Status> {
        self.ready(cx)?;
        let state = self.state();
        let t = state.table(table)?;
        t.check_columns(table, columns)?;
        match keys {
            KeySet::All => Ok(t
                .sorted_rows()
                .into_iter()
                .map(|(_, row)| t.project(row, columns))
                .collect()),
            KeySet::Keys(keys) => {
                let mut found = BTreeMap::new();
                for key in keys {
                    let id = t.row_id(table, key.parts())?;
                    if let Some(row) = t.rows.get(&id) {
                        found.insert(id, row);
                    }
                }
                let mut rows: Vec<_> = found.into_values().collect();
                rows.sort_by(|(a, _), (b, _)| key_cmp(a, b));
                Ok(rows.into_iter().map(|(_, row)| t.project(row, columns)).collect())
            }
        }
    }

    fn key_columns(&self, cx: &Context, table: &str) -> Result<Vec<String>, Status> {
        self.ready(cx)?;
        Ok(self.state().table(table)?.key.clone())
    }

    fn close(&self) {
        self.inner.closed.store(true, AtomicOrdering::Release);
    }

    fn is_closed(&self) -> bool {
        self.inner.closed.load(AtomicOrdering::Acquire)
    }
}
