use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tetra_core::{Client, ClientSource, Context, Repository, RepositoryError, RepositoryResult};
use tetra_model::Entity;
use tetra_types::EntityKey;

use crate::{Key, KeySet, Mutation, SPANNER_CLIENT, SpannerClient};

/// The mutation `set` writes with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Stored columns the entity does not map are kept.
    #[default]
    InsertOrUpdate,
    /// The row is rewritten; columns the entity does not map become `NULL`.
    Replace,
}

/// Repository over a table named after the key's entity name, whose
/// primary key is the key column alone. Keys naming any other column are
/// rejected as `InvalidKey` before anything is read or written.
pub struct SpannerRepository<E> {
    client: ClientSource<SpannerClient>,
    mode: WriteMode,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> SpannerRepository<E> {
    #[must_use]
    pub fn new(client: impl Into<ClientSource<SpannerClient>>) -> Self {
        Self {
            client: client.into(),
            mode: WriteMode::default(),
            _entity: PhantomData,
        }
    }

    #[must_use]
    pub fn scoped() -> Self {
        Self::new(SPANNER_CLIENT)
    }

    #[must_use]
    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Writes the entity and returns the commit timestamp.
    pub fn set_at(&self, cx: &Context, key: &EntityKey, entity: &E) -> RepositoryResult<DateTime<Utc>> {
        let client = self.prepare(key, cx)?;
        let mut record = entity.to_record();
        record.push_if_absent(key.name(), key.value().clone());
        let table = key.entity_name();
        let mutation = match self.mode {
            WriteMode::InsertOrUpdate => Mutation::insert_or_update_record(table, record),
            WriteMode::Replace => Mutation::replace_record(table, record),
        };
        client.apply(cx, vec![mutation])
    }

    fn prepare(&self, key: &EntityKey, cx: &Context) -> RepositoryResult<Arc<SpannerClient>> {
        key.validate()?;
        let client = self.client.resolve(cx)?;
        let primary = client.key_columns(cx, key.entity_name())?;
        if !matches!(primary.as_slice(), [only] if only == key.name()) {
            return Err(RepositoryError::InvalidKey(format!(
                "{key} does not address a row: the primary key of {} is ({})",
                key.entity_name(),
                primary.join(", ")
            )));
        }
        Ok(client)
    }
}

impl<E: Entity> Repository<E> for SpannerRepository<E> {
    fn get(&self, cx: &Context, key: &EntityKey) -> RepositoryResult<E> {
        let client = self.prepare(key, cx)?;
        let columns: Vec<String> = E::descriptor()
            .columns()
            .into_iter()
            .map(String::from)
            .collect();
        let row = client.single().read_row(
            cx,
            key.entity_name(),
            &Key::from(key.value().clone()),
            &columns,
        )?;
        Ok(E::from_record(row)?)
    }

    fn set(&self, cx: &Context, key: &EntityKey, entity: &E) -> RepositoryResult<()> {
        self.set_at(cx, key, entity).map(|_| ())
    }

    fn delete(&self, cx: &Context, key: &EntityKey) -> RepositoryResult<()> {
        let client = self.prepare(key, cx)?;
        let keys = KeySet::from(Key::from(key.value().clone()));
        client
            .apply(cx, vec![Mutation::delete(key.entity_name(), keys)])
            .map(|_| ())
    }

    fn close(&self, cx: &Context) -> RepositoryResult<()> {
        self.client.resolve(cx)?.close()
    }
}
