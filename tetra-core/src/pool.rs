use std::sync::Arc;

use tetra_registry::Token;

use crate::{Context, RepositoryError, RepositoryResult};

/// A bound, backend-specific handle.
///
/// A client is a thin view over its pool's native session. Closing it
/// releases per-client state only; the session stays open until the pool
/// is closed.
pub trait Client: Send + Sync + 'static {
    fn close(&self) -> RepositoryResult<()>;
}

/// The single source of clients for one backend session.
pub trait ClientPool: Send + Sync + 'static {
    type Client: Client;

    /// Where units of work find the client in their registry tree.
    const CLIENT: Token<Self::Client>;

    /// Returns a new client over the shared session. Fails with
    /// `InvalidState` once the session is closed.
    fn get(&self) -> RepositoryResult<Arc<Self::Client>>;

    /// Closes the native session. Later `get` calls fail.
    fn close(&self) -> RepositoryResult<()>;

    fn is_closed(&self) -> bool;
}

/// How a repository finds its client: injected at construction, or looked
/// up in the context tree on every call.
pub enum ClientSource<C> {
    Injected(Arc<C>),
    Scoped(Token<C>),
}

impl<C: Client> ClientSource<C> {
    pub fn resolve(&self, cx: &Context) -> RepositoryResult<Arc<C>> {
        match self {
            ClientSource::Injected(client) => Ok(Arc::clone(client)),
            ClientSource::Scoped(token) => cx.tree().reference(token)?.ok_or_else(|| {
                RepositoryError::InvalidState(format!("no client bound at {}", token.path()))
            }),
        }
    }
}

impl<C> Clone for ClientSource<C> {
    fn clone(&self) -> Self {
        match self {
            ClientSource::Injected(client) => ClientSource::Injected(Arc::clone(client)),
            ClientSource::Scoped(token) => ClientSource::Scoped(token.clone()),
        }
    }
}

impl<C> From<Arc<C>> for ClientSource<C> {
    fn from(client: Arc<C>) -> Self {
        ClientSource::Injected(client)
    }
}

impl<C> From<Token<C>> for ClientSource<C> {
    fn from(token: Token<C>) -> Self {
        ClientSource::Scoped(token)
    }
}

impl<C> std::fmt::Debug for ClientSource<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientSource::Injected(_) => f.write_str("Injected"),
            ClientSource::Scoped(token) => write!(f, "Scoped({})", token.path()),
        }
    }
}
