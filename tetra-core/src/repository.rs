use std::sync::Arc;

use tetra_model::Entity;
use tetra_registry::{Roots, Token, Tree};
use tetra_types::EntityKey;

use crate::{Context, RepositoryResult};

/// CRUD over one entity type on one backend.
///
/// `get` of a key that was never set, or was deleted, fails with
/// [`RepositoryError::NotFound`](crate::RepositoryError::NotFound) on every
/// backend. `delete` of a missing key succeeds. `close` releases the
/// repository's client; it never closes the pool's session.
pub trait Repository<E: Entity>: Send + Sync {
    fn get(&self, cx: &Context, key: &EntityKey) -> RepositoryResult<E>;

    fn set(&self, cx: &Context, key: &EntityKey, entity: &E) -> RepositoryResult<()>;

    fn delete(&self, cx: &Context, key: &EntityKey) -> RepositoryResult<()>;

    fn close(&self, cx: &Context) -> RepositoryResult<()>;
}

/// Registry path of the application's repository.
pub const REPOSITORY_PATH: &str = "/tetra/repository";

#[must_use]
pub fn repository_token<E: Entity>() -> Token<dyn Repository<E>> {
    Token::new(REPOSITORY_PATH)
}

pub fn register_repository<E: Entity>(roots: &mut Roots, repository: Option<Arc<dyn Repository<E>>>) {
    roots.register(&repository_token::<E>(), repository);
}

pub fn reference_repository<E: Entity>(tree: &Tree) -> RepositoryResult<Option<Arc<dyn Repository<E>>>> {
    Ok(tree.reference(&repository_token::<E>())?)
}

/// # Panics
///
/// Panics if no repository for `E` is registered.
#[must_use]
pub fn must_reference_repository<E: Entity>(tree: &Tree) -> Option<Arc<dyn Repository<E>>> {
    tree.must_reference(&repository_token::<E>())
}
