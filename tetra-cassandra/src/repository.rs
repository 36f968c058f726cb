use std::marker::PhantomData;
use std::sync::Arc;

use tetra_core::{Client, ClientSource, Context, Repository, RepositoryResult};
use tetra_model::Entity;
use tetra_types::EntityKey;

use crate::{CQL_CLIENT, CqlClient, cql};

/// Repository over a CQL table named after the key's entity name, which
/// may be keyspace-qualified.
///
/// Nested fields travel as maps and collections as lists, the way user
/// defined types and collection columns do. Writing a `NULL` column
/// removes it, so optional fields read back as `None` and empty
/// collections as empty.
pub struct CassandraRepository<E> {
    client: ClientSource<CqlClient>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> CassandraRepository<E> {
    #[must_use]
    pub fn new(client: impl Into<ClientSource<CqlClient>>) -> Self {
        Self {
            client: client.into(),
            _entity: PhantomData,
        }
    }

    #[must_use]
    pub fn scoped() -> Self {
        Self::new(CQL_CLIENT)
    }

    fn prepare(&self, cx: &Context, key: &EntityKey) -> RepositoryResult<Arc<CqlClient>> {
        key.validate()?;
        cx.check().map_err(|s| s.into_repository_error(key.to_string()))?;
        self.client.resolve(cx)
    }
}

impl<E: Entity> Repository<E> for CassandraRepository<E> {
    fn get(&self, cx: &Context, key: &EntityKey) -> RepositoryResult<E> {
        let client = self.prepare(cx, key)?;
        let statement = cql::select(key.entity_name())
            .columns(&E::descriptor().columns())
            .where_eq(key.name())
            .to_cql();
        let record = client.query_one(&statement, &[key.value().clone()])?;
        Ok(E::from_record(record)?)
    }

    /// CQL inserts are upserts; no read happens before the write.
    fn set(&self, cx: &Context, key: &EntityKey, entity: &E) -> RepositoryResult<()> {
        let client = self.prepare(cx, key)?;
        let mut record = entity.to_record();
        record.push_if_absent(key.name(), key.value().clone());
        let (columns, values) = record.into_parts();
        let statement = cql::insert(key.entity_name()).columns(&columns).to_cql();
        client.exec(&statement, &values)
    }

    fn delete(&self, cx: &Context, key: &EntityKey) -> RepositoryResult<()> {
        let client = self.prepare(cx, key)?;
        let statement = cql::delete(key.entity_name())
            .where_eq(key.name())
            .to_cql();
        client.exec(&statement, &[key.value().clone()])
    }

    fn close(&self, cx: &Context) -> RepositoryResult<()> {
        self.client.resolve(cx)?.close()
    }
}
