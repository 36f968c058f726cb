use std::sync::Arc;

use chrono::{DateTime, Utc};
use tetra_core::{Client, Context, RepositoryError, RepositoryResult, Status};
use tetra_types::Value;
use tracing::{debug, error};

use crate::{
    Direction, Document, DocumentStore, Filter, Op, SetOption, Snapshot, StructuredQuery, Write,
    path,
};

/// Document access over the pool's shared store.
#[derive(Clone)]
pub struct FirestoreClient {
    store: Arc<dyn DocumentStore>,
}

impl FirestoreClient {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    #[must_use]
    pub fn doc(&self, path: impl Into<String>) -> DocumentRef {
        DocumentRef {
            store: Arc::clone(&self.store),
            path: path.into(),
        }
    }

    #[must_use]
    pub fn collection(&self, path: impl Into<String>) -> CollectionRef {
        CollectionRef {
            store: Arc::clone(&self.store),
            path: path.into(),
        }
    }

    #[must_use]
    pub fn batch(&self) -> WriteBatch {
        WriteBatch {
            store: Arc::clone(&self.store),
            writes: Vec::new(),
        }
    }

    /// Reads several documents in one call. Missing documents come back as
    /// snapshots that do not exist.
    pub fn get_all(&self, cx: &Context, refs: &[DocumentRef]) -> RepositoryResult<Vec<Snapshot>> {
        let paths: Vec<String> = refs.iter().map(|r| r.path.clone()).collect();
        let snapshots = self
            .store
            .get_all(cx, &paths)
            .map_err(|s| failed("get_all", &paths.join(","), s))?;
        debug!("Read {} documents", snapshots.len());
        Ok(snapshots)
    }
}

impl Client for FirestoreClient {
    /// The store belongs to the pool; nothing to release here.
    fn close(&self) -> RepositoryResult<()> {
        debug!("Released firestore client");
        Ok(())
    }
}

/// A reference to one document, which may not exist.
#[derive(Clone)]
pub struct DocumentRef {
    store: Arc<dyn DocumentStore>,
    path: String,
}

impl DocumentRef {
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn id(&self) -> &str {
        path::id(&self.path)
    }

    #[must_use]
    pub fn parent(&self) -> CollectionRef {
        CollectionRef {
            store: Arc::clone(&self.store),
            path: path::parent(&self.path).to_string(),
        }
    }

    /// A subcollection of this document.
    #[must_use]
    pub fn collection(&self, id: &str) -> CollectionRef {
        CollectionRef {
            store: Arc::clone(&self.store),
            path: format!("{}/{id}", self.path),
        }
    }

    /// Reads the document. A missing document is `NotFound`.
    pub fn get(&self, cx: &Context) -> RepositoryResult<Snapshot> {
        let snapshot = self
            .store
            .get(cx, &self.path)
            .map_err(|s| failed("get", &self.path, s))?;
        debug!("Read document {}", self.path);
        Ok(snapshot)
    }

    /// Replaces the whole document.
    pub fn set(&self, cx: &Context, data: Document) -> RepositoryResult<DateTime<Utc>> {
        self.set_with(cx, data, &SetOption::Overwrite)
    }

    pub fn set_with(
        &self,
        cx: &Context,
        data: Document,
        option: &SetOption,
    ) -> RepositoryResult<DateTime<Utc>> {
        let time = self
            .store
            .set(cx, &self.path, data, option)
            .map_err(|s| failed("set", &self.path, s))?;
        debug!("Wrote document {} ({:?})", self.path, option);
        Ok(time)
    }

    /// Deletes the document; a missing document is not an error.
    pub fn delete(&self, cx: &Context) -> RepositoryResult<DateTime<Utc>> {
        let time = self
            .store
            .delete(cx, &self.path)
            .map_err(|s| failed("delete", &self.path, s))?;
        debug!("Deleted document {}", self.path);
        Ok(time)
    }
}

impl std::fmt::Debug for DocumentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DocumentRef").field(&self.path).finish()
    }
}

/// A reference to a collection; also the unfiltered query over it.
#[derive(Clone)]
pub struct CollectionRef {
    store: Arc<dyn DocumentStore>,
    path: String,
}

impl CollectionRef {
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn id(&self) -> &str {
        path::id(&self.path)
    }

    #[must_use]
    pub fn doc(&self, id: &str) -> DocumentRef {
        DocumentRef {
            store: Arc::clone(&self.store),
            path: format!("{}/{id}", self.path),
        }
    }

    #[must_use]
    pub fn query(&self) -> Query {
        Query {
            store: Arc::clone(&self.store),
            query: StructuredQuery {
                collection: self.path.clone(),
                ..StructuredQuery::default()
            },
        }
    }

    #[must_use]
    pub fn where_field(&self, field: &str, op: Op, value: impl Into<Value>) -> Query {
        self.query().where_field(field, op, value)
    }

    #[must_use]
    pub fn order_by(&self, field: &str, direction: Direction) -> Query {
        self.query().order_by(field, direction)
    }

    pub fn documents(&self, cx: &Context) -> RepositoryResult<Vec<Snapshot>> {
        self.query().documents(cx)
    }
}

/// A filtered, ordered and paged read over one collection.
#[derive(Clone)]
pub struct Query {
    store: Arc<dyn DocumentStore>,
    query: StructuredQuery,
}

impl Query {
    #[must_use]
    pub fn where_field(mut self, field: &str, op: Op, value: impl Into<Value>) -> Self {
        self.query.filters.push(Filter {
            field: field.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.query.order_by.push((field.to_string(), direction));
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: usize) -> Self {
        self.query.offset = offset;
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn structured(&self) -> &StructuredQuery {
        &self.query
    }

    pub fn documents(&self, cx: &Context) -> RepositoryResult<Vec<Snapshot>> {
        let snapshots = self
            .store
            .run_query(cx, &self.query)
            .map_err(|s| failed("query", &self.query.collection, s))?;
        debug!(
            "Query on {} returned {} documents",
            self.query.collection,
            snapshots.len()
        );
        Ok(snapshots)
    }
}

/// Writes applied together by [`WriteBatch::commit`].
pub struct WriteBatch {
    store: Arc<dyn DocumentStore>,
    writes: Vec<Write>,
}

impl WriteBatch {
    #[must_use]
    pub fn set(self, doc: &DocumentRef, data: Document) -> Self {
        self.set_with(doc, data, SetOption::Overwrite)
    }

    #[must_use]
    pub fn set_with(mut self, doc: &DocumentRef, data: Document, option: SetOption) -> Self {
        self.writes.push(Write::Set {
            path: doc.path.clone(),
            data,
            option,
        });
        self
    }

    #[must_use]
    pub fn delete(mut self, doc: &DocumentRef) -> Self {
        self.writes.push(Write::Delete {
            path: doc.path.clone(),
        });
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Applies every write atomically. An empty batch is rejected.
    pub fn commit(self, cx: &Context) -> RepositoryResult<DateTime<Utc>> {
        if self.writes.is_empty() {
            return Err(RepositoryError::InvalidStatement(
                "cannot commit an empty write batch".into(),
            ));
        }
        let count = self.writes.len();
        let time = self
            .store
            .commit(cx, self.writes)
            .map_err(|s| failed("commit", &format!("{count} writes"), s))?;
        debug!("Committed {} writes at {}", count, time);
        Ok(time)
    }
}

fn failed(op: &str, target: &str, status: Status) -> RepositoryError {
    if status.is_not_found() {
        debug!("Firestore {} {}: not found", op, target);
    } else {
        error!("Firestore {} failed on {}: {}", op, target, status);
    }
    status.into_repository_error(format!("firestore {op} {target}"))
}
