use std::sync::{Arc, PoisonError, RwLock};

use tetra_registry::{Roots, Token, Tree};
use tracing::{debug, info, warn};

use crate::{Client, ClientPool, Context, RepositoryError, RepositoryResult};

/// Holds one client pool and the registry roots of an application.
///
/// Construct one per backend and pass it by reference. Units of work run
/// through [`Persistence::execute`], which binds a fresh client into a tree
/// derived from the roots and closes the client afterwards.
pub struct Persistence<P: ClientPool> {
    pool: RwLock<Option<Arc<P>>>,
    roots: RwLock<Roots>,
}

impl<P: ClientPool> Persistence<P> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pool: RwLock::new(None),
            roots: RwLock::new(Roots::new()),
        }
    }

    /// Publishes `pool`. A pool whose session is already closed is
    /// rejected. Setting up again replaces the previous pool without
    /// closing it.
    pub fn setup(&self, pool: Arc<P>) -> RepositoryResult<()> {
        if pool.is_closed() {
            return Err(RepositoryError::InvalidClientPool(
                "the provided pool is closed".into(),
            ));
        }
        *self.pool.write().unwrap_or_else(PoisonError::into_inner) = Some(pool);
        info!("Persistence set up (client path={})", P::CLIENT.path());
        Ok(())
    }

    #[must_use]
    pub fn is_setup(&self) -> bool {
        self.pool
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn pool(&self) -> RepositoryResult<Arc<P>> {
        self.pool
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| RepositoryError::InvalidState("persistence is not set up".into()))
    }

    /// Acquires a client from the pool.
    pub fn client(&self) -> RepositoryResult<Arc<P::Client>> {
        self.pool()?.get()
    }

    /// Adds a binding to the roots. Trees derived afterwards see it.
    pub fn register<T>(&self, token: &Token<T>, value: Option<Arc<T>>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.roots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(token, value);
    }

    /// A tree over the current roots, without a client binding.
    #[must_use]
    pub fn tree(&self) -> Tree {
        self.roots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .new_tree_default()
    }

    /// Runs one unit of work with a fresh client bound at `P::CLIENT`.
    pub fn execute<R, F>(&self, work: F) -> RepositoryResult<R>
    where
        F: FnOnce(&Context) -> RepositoryResult<R>,
    {
        self.execute_in(&Context::background(), work)
    }

    /// Like [`Persistence::execute`] but keeps the deadline of `parent`.
    pub fn execute_in<R, F>(&self, parent: &Context, work: F) -> RepositoryResult<R>
    where
        F: FnOnce(&Context) -> RepositoryResult<R>,
    {
        let client = self.client()?;
        let mut roots = self
            .roots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        roots.register(&P::CLIENT, Some(Arc::clone(&client)));
        let cx = parent.clone().with_tree(roots.new_tree_default());
        debug!("Executing unit of work (bindings={})", cx.tree().len());

        let result = work(&cx);
        if let Err(e) = client.close() {
            warn!("Failed to close unit-of-work client: {}", e);
        }
        result
    }

    /// Closes the pool's session. Later units of work fail.
    pub fn close(&self) -> RepositoryResult<()> {
        let pool = self.pool()?;
        pool.close()?;
        info!("Persistence closed (client path={})", P::CLIENT.path());
        Ok(())
    }
}

impl<P: ClientPool> Default for Persistence<P> {
    fn default() -> Self {
        Self::new()
    }
}
