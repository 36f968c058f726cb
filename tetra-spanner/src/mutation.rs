use std::fmt;

use tetra_model::Record;
use tetra_types::Value;

/// A primary key: one value per key column, in key order.
#[derive(Debug, Clone, PartialEq)]
pub struct Key(Vec<Value>);

impl Key {
    #[must_use]
    pub fn new(parts: Vec<Value>) -> Self {
        Self(parts)
    }

    #[must_use]
    pub fn parts(&self) -> &[Value] {
        &self.0
    }
}

impl From<Value> for Key {
    fn from(value: Value) -> Self {
        Self(vec![value])
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{part}")?;
        }
        write!(f, ")")
    }
}

/// The rows a read or delete addresses.
#[derive(Debug, Clone, PartialEq)]
pub enum KeySet {
    Keys(Vec<Key>),
    All,
}

impl KeySet {
    #[must_use]
    pub fn keys(keys: impl IntoIterator<Item = Key>) -> Self {
        KeySet::Keys(keys.into_iter().collect())
    }

    #[must_use]
    pub fn all() -> Self {
        KeySet::All
    }
}

impl From<Key> for KeySet {
    fn from(key: Key) -> Self {
        KeySet::Keys(vec![key])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOp {
    /// Fails if the row exists.
    Insert,
    /// Fails if the row does not exist; unlisted columns keep their values.
    Update,
    /// Inserts, or updates the listed columns of an existing row.
    InsertOrUpdate,
    /// Inserts, or rewrites the whole row; unlisted columns become `NULL`.
    Replace,
    Delete,
}

/// One write of an atomic commit.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    op: MutationOp,
    table: String,
    columns: Vec<String>,
    values: Vec<Value>,
    key_set: KeySet,
}

impl Mutation {
    fn write(op: MutationOp, table: &str, columns: Vec<String>, values: Vec<Value>) -> Self {
        Self {
            op,
            table: table.to_string(),
            columns,
            values,
            key_set: KeySet::Keys(Vec::new()),
        }
    }

    #[must_use]
    pub fn insert(table: &str, columns: Vec<String>, values: Vec<Value>) -> Self {
        Self::write(MutationOp::Insert, table, columns, values)
    }

    #[must_use]
    pub fn update(table: &str, columns: Vec<String>, values: Vec<Value>) -> Self {
        Self::write(MutationOp::Update, table, columns, values)
    }

    #[must_use]
    pub fn insert_or_update(table: &str, columns: Vec<String>, values: Vec<Value>) -> Self {
        Self::write(MutationOp::InsertOrUpdate, table, columns, values)
    }

    #[must_use]
    pub fn replace(table: &str, columns: Vec<String>, values: Vec<Value>) -> Self {
        Self::write(MutationOp::Replace, table, columns, values)
    }

    #[must_use]
    pub fn delete(table: &str, key_set: impl Into<KeySet>) -> Self {
        Self {
            op: MutationOp::Delete,
            table: table.to_string(),
            columns: Vec::new(),
            values: Vec::new(),
            key_set: key_set.into(),
        }
    }

    #[must_use]
    pub fn insert_record(table: &str, record: Record) -> Self {
        let (columns, values) = record.into_parts();
        Self::insert(table, columns, values)
    }

    #[must_use]
    pub fn update_record(table: &str, record: Record) -> Self {
        let (columns, values) = record.into_parts();
        Self::update(table, columns, values)
    }

    #[must_use]
    pub fn insert_or_update_record(table: &str, record: Record) -> Self {
        let (columns, values) = record.into_parts();
        Self::insert_or_update(table, columns, values)
    }

    #[must_use]
    pub fn replace_record(table: &str, record: Record) -> Self {
        let (columns, values) = record.into_parts();
        Self::replace(table, columns, values)
    }

    #[must_use]
    pub fn op(&self) -> MutationOp {
        self.op
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// The rows a delete removes; empty for other operations.
    #[must_use]
    pub fn key_set(&self) -> &KeySet {
        &self.key_set
    }
}
