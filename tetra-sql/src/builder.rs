//! Parameterized statement builder.
//!
//! Every builder produces `(sql, args)` with one placeholder per argument,
//! numbered in argument order for dialects that number them.

use tetra_model::Record;
use tetra_types::Value;

use crate::Dialect;

/// Tracks placeholders and arguments while a statement is rendered.
struct Binder {
    dialect: Dialect,
    args: Vec<Value>,
}

impl Binder {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            args: Vec::new(),
        }
    }

    fn bind(&mut self, value: Value) -> String {
        self.args.push(value);
        self.dialect.placeholder(self.args.len())
    }

    fn where_clause(&mut self, sql: &mut String, conditions: Vec<(String, Value)>) {
        for (i, (column, value)) in conditions.into_iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            sql.push_str(&self.dialect.quote(&column));
            sql.push_str(" = ");
            let placeholder = self.bind(value);
            sql.push_str(&placeholder);
        }
    }
}

fn column_list(dialect: Dialect, columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| dialect.quote(c))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone)]
pub struct Select {
    dialect: Dialect,
    table: String,
    columns: Vec<String>,
    conditions: Vec<(String, Value)>,
    limit: Option<u64>,
}

#[must_use]
pub fn select_from<S: AsRef<str>>(dialect: Dialect, table: &str, columns: &[S]) -> Select {
    Select {
        dialect,
        table: table.to_string(),
        columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
        conditions: Vec::new(),
        limit: None,
    }
}

impl Select {
    #[must_use]
    pub fn where_eq(mut self, column: &str, value: Value) -> Self {
        self.conditions.push((column.to_string(), value));
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn build(self) -> (String, Vec<Value>) {
        let mut binder = Binder::new(self.dialect);
        let mut sql = format!(
            "SELECT {} FROM {}",
            column_list(self.dialect, &self.columns),
            self.dialect.quote(&self.table)
        );
        binder.where_clause(&mut sql, self.conditions);
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        (sql, binder.args)
    }
}

#[derive(Debug, Clone)]
pub struct Insert {
    dialect: Dialect,
    table: String,
    values: Vec<(String, Value)>,
}

#[must_use]
pub fn insert_into(dialect: Dialect, table: &str) -> Insert {
    Insert {
        dialect,
        table: table.to_string(),
        values: Vec::new(),
    }
}

impl Insert {
    #[must_use]
    pub fn value(mut self, column: &str, value: Value) -> Self {
        self.values.push((column.to_string(), value));
        self
    }

    /// Adds every column of `record`, in record order.
    #[must_use]
    pub fn record(mut self, record: Record) -> Self {
        self.values.extend(record);
        self
    }

    #[must_use]
    pub fn build(self) -> (String, Vec<Value>) {
        let mut binder = Binder::new(self.dialect);
        let (columns, values): (Vec<String>, Vec<Value>) = self.values.into_iter().unzip();
        let placeholders: Vec<String> = values.into_iter().map(|v| binder.bind(v)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.dialect.quote(&self.table),
            column_list(self.dialect, &columns),
            placeholders.join(", ")
        );
        (sql, binder.args)
    }
}

#[derive(Debug, Clone)]
pub struct Update {
    dialect: Dialect,
    table: String,
    sets: Vec<(String, Value)>,
    conditions: Vec<(String, Value)>,
}

#[must_use]
pub fn update(dialect: Dialect, table: &str) -> Update {
    Update {
        dialect,
        table: table.to_string(),
        sets: Vec::new(),
        conditions: Vec::new(),
    }
}

impl Update {
    #[must_use]
    pub fn set(mut self, column: &str, value: Value) -> Self {
        self.sets.push((column.to_string(), value));
        self
    }

    #[must_use]
    pub fn record(mut self, record: Record) -> Self {
        self.sets.extend(record);
        self
    }

    #[must_use]
    pub fn where_eq(mut self, column: &str, value: Value) -> Self {
        self.conditions.push((column.to_string(), value));
        self
    }

    #[must_use]
    pub fn build(self) -> (String, Vec<Value>) {
        let mut binder = Binder::new(self.dialect);
        let assignments: Vec<String> = self
            .sets
            .into_iter()
            .map(|(column, value)| {
                let placeholder = binder.bind(value);
                format!("{} = {}", self.dialect.quote(&column), placeholder)
            })
            .collect();
        let mut sql = format!(
            "UPDATE {} SET {}",
            self.dialect.quote(&self.table),
            assignments.join(", ")
        );
        binder.where_clause(&mut sql, self.conditions);
        (sql, binder.args)
    }
}

#[derive(Debug, Clone)]
pub struct Delete {
    dialect: Dialect,
    table: String,
    conditions: Vec<(String, Value)>,
}

#[must_use]
pub fn delete_from(dialect: Dialect, table: &str) -> Delete {
    Delete {
        dialect,
        table: table.to_string(),
        conditions: Vec::new(),
    }
}

impl Delete {
    #[must_use]
    pub fn where_eq(mut self, column: &str, value: Value) -> Self {
        self.conditions.push((column.to_string(), value));
        self
    }

    #[must_use]
    pub fn build(self) -> (String, Vec<Value>) {
        let mut binder = Binder::new(self.dialect);
        let mut sql = format!("DELETE FROM {}", self.dialect.quote(&self.table));
        binder.where_clause(&mut sql, self.conditions);
        (sql, binder.args)
    }
}
