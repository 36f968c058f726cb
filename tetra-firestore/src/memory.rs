//! In-process document store.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use tetra_core::{Code, Context, Status};
use tetra_types::Value;

use crate::store::{field, merge_all, set_field};
use crate::{
    Connector, Direction, Document, DocumentStore, Filter, FirestoreConfig, Op, SetOption,
    Snapshot, StructuredQuery, Write, path,
};

#[derive(Debug)]
struct Stored {
    data: Document,
    update_time: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    documents: BTreeMap<String, Stored>,
    last_write: Option<DateTime<Utc>>,
}

impl State {
    /// Write times strictly increase, even within one clock tick.
    fn next_write_time(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let time = match self.last_write {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_write = Some(time);
        time
    }

    fn apply(&mut self, write: Write, time: DateTime<Utc>) {
        match write {
            Write::Delete { path } => {
                self.documents.remove(&path);
            }
            Write::Set { path, data, option } => {
                let current = match option {
                    SetOption::Overwrite => data,
                    SetOption::MergeAll => {
                        let mut current = self.take(&path);
                        merge_all(&mut current, data);
                        current
                    }
                    SetOption::Merge(fields) => {
                        let mut current = self.take(&path);
                        for field_path in &fields {
                            if let Some(value) = field(&data, field_path) {
                                set_field(&mut current, field_path, value.clone());
                            }
                        }
                        current
                    }
                };
                self.documents.insert(
                    path,
                    Stored {
                        data: current,
                        update_time: time,
                    },
                );
            }
        }
    }

    fn take(&mut self, path: &str) -> Document {
        self.documents
            .remove(path)
            .map(|s| s.data)
            .unwrap_or_default()
    }

    fn snapshot(&self, path: &str) -> Snapshot {
        match self.documents.get(path) {
            Some(stored) => Snapshot::found(path, stored.data.clone(), stored.update_time),
            None => Snapshot::missing(path),
        }
    }
}

fn validate(write: &Write) -> Result<(), Status> {
    path::document(write.path())?;
    if let Write::Set {
        data,
        option: SetOption::Merge(fields),
        ..
    } = write
    {
        if let Some(missing) = fields.iter().find(|f| field(data, f).is_none()) {
            return Err(Status::invalid_argument(format!(
                "field path {missing:?} is not present in data"
            )));
        }
    }
    Ok(())
}

#[derive(Debug)]
struct Inner {
    project_id: String,
    state: Mutex<State>,
    closed: AtomicBool,
}

/// A document database held in memory. Clones share data and the closed
/// flag, like handles on one connection.
#[derive(Debug, Clone)]
pub struct MemoryFirestore {
    inner: Arc<Inner>,
}

impl MemoryFirestore {
    #[must_use]
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                project_id: project_id.into(),
                state: Mutex::default(),
                closed: AtomicBool::new(false),
            }),
        }
    }

    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.inner.project_id
    }

    /// Number of stored documents across all collections.
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.state().documents.len()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn ready(&self, cx: &Context) -> Result<(), Status> {
        if self.is_closed() {
            return Err(Status::new(
                Code::Cancelled,
                "grpc: the client connection is closing",
            ));
        }
        cx.check()
    }
}

impl Connector for MemoryFirestore {
    fn connect(&self, config: &FirestoreConfig) -> Result<Arc<dyn DocumentStore>, Status> {
        if config.project_id.is_empty() {
            return Err(Status::invalid_argument("project id is required"));
        }
        if config.project_id != self.inner.project_id {
            return Err(Status::failed_precondition(format!(
                "project {} is not served here",
                config.project_id
            )));
        }
        if self.is_closed() {
            return Err(Status::failed_precondition("store is closed"));
        }
        Ok(Arc::new(self.clone()))
    }
}

impl DocumentStore for MemoryFirestore {
    fn get(&self, cx: &Context, path: &str) -> Result<Snapshot, Status> {
        self.ready(cx)?;
        path::document(path)?;
        let snapshot = self.state().snapshot(path);
        if snapshot.exists() {
            Ok(snapshot)
        } else {
            Err(Status::not_found(format!("document {path:?} not found")))
        }
    }

    fn set(
        &self,
        cx: &Context,
        path: &str,
        data: Document,
        option: &SetOption,
    ) -> Result<DateTime<Utc>, Status> {
        self.commit(
            cx,
            vec![Write::Set {
                path: path.to_string(),
                data,
                option: option.clone(),
            }],
        )
    }

    fn delete(&self, cx: &Context, path: &str) -> Result<DateTime<Utc>, Status> {
        self.commit(
            cx,
            vec![Write::Delete {
                path: path.to_string(),
            }],
        )
    }

    fn get_all(&self, cx: &Context, paths: &[String]) -> Result<Vec<Snapshot>, Status> {
        self.ready(cx)?;
        for p in paths {
            path::document(p)?;
        }
        let state = self.state();
        Ok(paths.iter().map(|p| state.snapshot(p)).collect())
    }

    fn run_query(&self, cx: &Context, query: &StructuredQuery) -> Result<Vec<Snapshot>, Status> {
        self.ready(cx)?;
        path::collection(&query.collection)?;
        for filter in &query.filters {
            if filter.op == Op::In && !matches!(filter.value, Value::List(_)) {
                return Err(Status::invalid_argument(format!(
                    "'in' filter on {} needs a list value",
                    filter.field
                )));
            }
        }

        let state = self.state();
        let mut hits: Vec<(&String, &Stored)> = state
            .documents
            .iter()
            .filter(|(p, _)| path::parent(p) == query.collection)
            .filter(|(_, s)| query.filters.iter().all(|f| matches(&s.data, f)))
            .filter(|(_, s)| {
                query
                    .order_by
                    .iter()
                    .all(|(f, _)| field(&s.data, f).is_some())
            })
            .collect();
        hits.sort_by(|(pa, a), (pb, b)| {
            for (f, direction) in &query.order_by {
                let (Some(x), Some(y)) = (field(&a.data, f), field(&b.data, f)) else {
                    continue;
                };
                let ord = x.query_cmp(y).unwrap_or(Ordering::Equal);
                let ord = match direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            pa.cmp(pb)
        });

        Ok(hits
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .map(|(p, s)| Snapshot::found(p.clone(), s.data.clone(), s.update_time))
            .collect())
    }

    fn commit(&self, cx: &Context, writes: Vec<Write>) -> Result<DateTime<Utc>, Status> {
        self.ready(cx)?;
        for write in &writes {
            validate(write)?;
        }
        let mut state = self.state();
        let time = state.next_write_time();
        for write in writes {
            state.apply(write, time);
        }
        Ok(time)
    }

    fn close(&self) -> Result<(), Status> {
        self.inner.closed.store(true, AtomicOrdering::Release);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.inner.closed.load(AtomicOrdering::Acquire)
    }
}

fn matches(document: &Document, filter: &Filter) -> bool {
    let Some(actual) = field(document, &filter.field) else {
        return false;
    };
    let cmp = actual.query_cmp(&filter.value);
    match filter.op {
        Op::Eq => cmp == Some(Ordering::Equal),
        Op::Ne => cmp != Some(Ordering::Equal),
        Op::Lt => cmp == Some(Ordering::Less),
        Op::Le => matches!(cmp, Some(Ordering::Less | Ordering::Equal)),
        Op::Gt => cmp == Some(Ordering::Greater),
        Op::Ge => matches!(cmp, Some(Ordering::Greater | Ordering::Equal)),
        Op::ArrayContains => match actual {
            Value::List(items) => items
                .iter()
                .any(|i| i.query_cmp(&filter.value) == Some(Ordering::Equal)),
            _ => false,
        },
        Op::In => match &filter.value {
            Value::List(options) => options
                .iter()
                .any(|o| actual.query_cmp(o) == Some(Ordering::Equal)),
            _ => false,
        },
    }
}
