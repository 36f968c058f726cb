use std::marker::PhantomData;
use std::sync::Arc;

use tetra_core::{Client, ClientSource, Context, Repository, RepositoryError, RepositoryResult};
use tetra_model::{Entity, FieldKind, ModelError, Record};
use tetra_types::{EntityKey, Value};
use tracing::debug;

use crate::{DriverError, SQL_CLIENT, SqlClient, delete_from, insert_into, select_from, update};

/// Repository over a SQL table named after the key's entity name.
pub struct SqlRepository<E> {
    client: ClientSource<SqlClient>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> SqlRepository<E> {
    #[must_use]
    pub fn new(client: impl Into<ClientSource<SqlClient>>) -> Self {
        Self {
            client: client.into(),
            _entity: PhantomData,
        }
    }

    /// A repository that finds its client in each call's context.
    #[must_use]
    pub fn scoped() -> Self {
        Self::new(SQL_CLIENT)
    }

    fn prepare(&self, cx: &Context, key: &EntityKey) -> RepositoryResult<Arc<SqlClient>> {
        key.validate()?;
        cx.check().map_err(|s| s.into_repository_error(key.to_string()))?;
        self.client.resolve(cx)
    }
}

impl<E: Entity> Repository<E> for SqlRepository<E> {
    fn get(&self, cx: &Context, key: &EntityKey) -> RepositoryResult<E> {
        let client = self.prepare(cx, key)?;
        let columns = E::descriptor().columns();
        let (sql, args) = select_from(client.dialect(), key.entity_name(), &columns)
            .where_eq(key.name(), key.value().clone())
            .build();
        let record = client.query_one(&sql, &args)?;
        Ok(E::from_record(decode::<E>(record)?)?)
    }

    /// Inserts the entity; on a unique violation, updates the row with the
    /// key instead. Not atomic: concurrent writers of a new key race on the
    /// insert and the loser falls back to the update. The key column is
    /// written even when the entity does not map it.
    fn set(&self, cx: &Context, key: &EntityKey, entity: &E) -> RepositoryResult<()> {
        let client = self.prepare(cx, key)?;
        let dialect = client.dialect();
        let mut record = entity.to_record();
        record.push_if_absent(key.name(), key.value().clone());
        let record = encode::<E>(record)?;

        let (sql, args) = insert_into(dialect, key.entity_name())
            .record(record.clone())
            .build();
        match client.exec(&sql, &args) {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err, dialect) => {
                debug!("Insert hit a unique violation, updating {}", key);
                let (sql, args) = update(dialect, key.entity_name())
                    .record(record)
                    .where_eq(key.name(), key.value().clone())
                    .build();
                client.exec(&sql, &args).map(|_| ())
            }
            Err(err) => Err(err),
        }
    }

    fn delete(&self, cx: &Context, key: &EntityKey) -> RepositoryResult<()> {
        let client = self.prepare(cx, key)?;
        let (sql, args) = delete_from(client.dialect(), key.entity_name())
            .where_eq(key.name(), key.value().clone())
            .build();
        client.exec(&sql, &args).map(|_| ())
    }

    fn close(&self, cx: &Context) -> RepositoryResult<()> {
        self.client.resolve(cx)?.close()
    }
}

fn is_unique_violation(err: &RepositoryError, dialect: crate::Dialect) -> bool {
    err.backend_source::<DriverError>()
        .is_some_and(|e| dialect.is_unique_violation(e))
}

/// Nested and collection columns are stored as JSON text. `Null` stays
/// `NULL` so optional nested fields read back as `None`.
fn encode<E: Entity>(record: Record) -> RepositoryResult<Record> {
    let descriptor = E::descriptor();
    record
        .into_iter()
        .map(|(column, value)| -> RepositoryResult<(String, Value)> {
            let serialized = descriptor
                .field(&column)
                .is_some_and(|f| f.kind != FieldKind::Scalar);
            if serialized && !value.is_null() {
                let json = serde_json::to_string(&value)
                    .map_err(|e| ModelError::from(tetra_types::Error::from(e)).in_column(&column))?;
                Ok((column, Value::Text(json)))
            } else {
                Ok((column, value))
            }
        })
        .collect()
}

fn decode<E: Entity>(record: Record) -> RepositoryResult<Record> {
    let descriptor = E::descriptor();
    record
        .into_iter()
        .map(|(column, value)| -> RepositoryResult<(String, Value)> {
            let serialized = descriptor
                .field(&column)
                .is_some_and(|f| f.kind != FieldKind::Scalar);
            match value {
                Value::Text(json) if serialized => {
                    let value: Value = serde_json::from_str(&json).map_err(|e| {
                        ModelError::from(tetra_types::Error::from(e)).in_column(&column)
                    })?;
                    Ok((column, value))
                }
                other => Ok((column, other)),
            }
        })
        .collect()
}
