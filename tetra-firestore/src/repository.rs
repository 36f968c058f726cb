use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tetra_core::{Client, ClientSource, Context, Repository, RepositoryResult};
use tetra_model::Entity;
use tetra_types::EntityKey;

use crate::{DocumentRef, FIRESTORE_CLIENT, FirestoreClient, SetOption};

/// Repository over documents at `entity_name/value`.
///
/// The key only names the document; it is not added to the stored fields.
pub struct FirestoreRepository<E> {
    client: ClientSource<FirestoreClient>,
    option: SetOption,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> FirestoreRepository<E> {
    #[must_use]
    pub fn new(client: impl Into<ClientSource<FirestoreClient>>) -> Self {
        Self {
            client: client.into(),
            option: SetOption::Overwrite,
            _entity: PhantomData,
        }
    }

    #[must_use]
    pub fn scoped() -> Self {
        Self::new(FIRESTORE_CLIENT)
    }

    /// Makes `set` write with `option` instead of replacing documents.
    #[must_use]
    pub fn with_set_option(mut self, option: SetOption) -> Self {
        self.option = option;
        self
    }

    /// Writes the entity with an explicit option and returns the write time.
    pub fn set_with_option(
        &self,
        cx: &Context,
        key: &EntityKey,
        entity: &E,
        option: &SetOption,
    ) -> RepositoryResult<DateTime<Utc>> {
        let doc = self.doc(cx, key)?;
        doc.set_with(cx, entity.to_record().into_document(), option)
    }

    fn doc(&self, cx: &Context, key: &EntityKey) -> RepositoryResult<DocumentRef> {
        let path = key.document_id()?;
        let client: Arc<FirestoreClient> = self.client.resolve(cx)?;
        Ok(client.doc(path))
    }
}

impl<E: Entity> Repository<E> for FirestoreRepository<E> {
    fn get(&self, cx: &Context, key: &EntityKey) -> RepositoryResult<E> {
        self.doc(cx, key)?.get(cx)?.data_to()
    }

    fn set(&self, cx: &Context, key: &EntityKey, entity: &E) -> RepositoryResult<()> {
        self.set_with_option(cx, key, entity, &self.option)
            .map(|_| ())
    }

    fn delete(&self, cx: &Context, key: &EntityKey) -> RepositoryResult<()> {
        self.doc(cx, key)?.delete(cx).map(|_| ())
    }

    fn close(&self, cx: &Context) -> RepositoryResult<()> {
        self.client.resolve(cx)?.close()
    }
}
