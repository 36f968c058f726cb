//! The native boundary of the document adapter.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tetra_core::{Context, RepositoryError, RepositoryResult, Status};
use tetra_model::{Entity, Record};
use tetra_types::Value;

use crate::{FirestoreConfig, path};

/// Document data: top-level field name to value. Nested maps are
/// addressed with dotted field paths.
pub type Document = BTreeMap<String, Value>;

/// How a write treats fields already stored in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetOption {
    /// Replace the whole document.
    #[default]
    Overwrite,
    /// Merge every field of the data, recursing into maps.
    MergeAll,
    /// Write only the listed field paths; other stored fields stay.
    Merge(Vec<String>),
}

/// The outcome of reading one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    path: String,
    data: Option<Document>,
    update_time: Option<DateTime<Utc>>,
}

impl Snapshot {
    #[must_use]
    pub fn found(path: impl Into<String>, data: Document, update_time: DateTime<Utc>) -> Self {
        Self {
            path: path.into(),
            data: Some(data),
            update_time: Some(update_time),
        }
    }

    #[must_use]
    pub fn missing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            data: None,
            update_time: None,
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The document id, the last path segment.
    #[must_use]
    pub fn id(&self) -> &str {
        path::id(&self.path)
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.data.is_some()
    }

    #[must_use]
    pub fn data(&self) -> Option<&Document> {
        self.data.as_ref()
    }

    #[must_use]
    pub fn update_time(&self) -> Option<DateTime<Utc>> {
        self.update_time
    }

    /// Decodes the document into an entity. A missing document is
    /// `NotFound`.
    pub fn data_to<E: Entity>(self) -> RepositoryResult<E> {
        let data = self.data.ok_or(RepositoryError::NotFound)?;
        Ok(E::from_record(Record::from_document(data))?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    ArrayContains,
    In,
}

impl Op {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Eq => "==",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::ArrayContains => "array-contains",
            Op::In => "in",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Op {
    type Err = Status;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(Op::Eq),
            "!=" => Ok(Op::Ne),
            "<" => Ok(Op::Lt),
            "<=" => Ok(Op::Le),
            ">" => Ok(Op::Gt),
            ">=" => Ok(Op::Ge),
            "array-contains" => Ok(Op::ArrayContains),
            "in" => Ok(Op::In),
            other => Err(Status::invalid_argument(format!("invalid operator {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub op: Op,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// A query over the direct children of one collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredQuery {
    pub collection: String,
    pub filters: Vec<Filter>,
    pub order_by: Vec<(String, Direction)>,
    pub offset: usize,
    pub limit: Option<usize>,
}

/// One write of a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Set {
        path: String,
        data: Document,
        option: SetOption,
    },
    Delete {
        path: String,
    },
}

impl Write {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Write::Set { path, .. } | Write::Delete { path } => path,
        }
    }
}

/// A document database. Every call honours the deadline of `cx`.
pub trait DocumentStore: Send + Sync {
    /// Reads one document. A missing document is a `NotFound` status.
    fn get(&self, cx: &Context, path: &str) -> Result<Snapshot, Status>;

    /// Writes one document and returns the write time.
    fn set(
        &self,
        cx: &Context,
        path: &str,
        data: Document,
        option: &SetOption,
    ) -> Result<DateTime<Utc>, Status>;

    /// Deletes one document. Deleting a missing document succeeds.
    fn delete(&self, cx: &Context, path: &str) -> Result<DateTime<Utc>, Status>;

    /// Reads several documents; missing ones come back as non-existent
    /// snapshots, in request order.
    fn get_all(&self, cx: &Context, paths: &[String]) -> Result<Vec<Snapshot>, Status>;

    fn run_query(&self, cx: &Context, query: &StructuredQuery) -> Result<Vec<Snapshot>, Status>;

    /// Applies all writes atomically at one write time.
    fn commit(&self, cx: &Context, writes: Vec<Write>) -> Result<DateTime<Utc>, Status>;

    fn close(&self) -> Result<(), Status>;

    fn is_closed(&self) -> bool;
}

/// Opens a document store from connection settings.
pub trait Connector: Send + Sync {
    fn connect(&self, config: &FirestoreConfig) -> Result<Arc<dyn DocumentStore>, Status>;
}

/// Looks up a dotted field path.
pub(crate) fn field<'a>(document: &'a Document, field_path: &str) -> Option<&'a Value> {
    let mut parts = field_path.split('.');
    let mut current = document.get(parts.next()?)?;
    for part in parts {
        match current {
            Value::Map(fields) => current = fields.get(part)?,
            _ => return None,
        }
    }
    Some(current)
}

/// Stores `value` at a dotted field path, creating intermediate maps.
pub(crate) fn set_field(document: &mut Document, field_path: &str, value: Value) {
    match field_path.split_once('.') {
        None => {
            document.insert(field_path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = document
                .entry(head.to_string())
                .or_insert_with(|| Value::Map(BTreeMap::new()));
            if !matches!(entry, Value::Map(_)) {
                *entry = Value::Map(BTreeMap::new());
            }
            if let Value::Map(fields) = entry {
                set_field(fields, rest, value);
            }
        }
    }
}

/// Merges `data` into `target`, recursing where both sides hold maps.
pub(crate) fn merge_all(target: &mut Document, data: Document) {
    for (name, value) in data {
        let slot = target.entry(name).or_insert(Value::Null);
        match (slot, value) {
            (Value::Map(existing), Value::Map(incoming)) => merge_all(existing, incoming),
            (slot, value) => *slot = value,
        }
    }
}
