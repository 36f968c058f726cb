//! Error types for repositories and pools.

use std::error::Error as StdError;

use tetra_model::ModelError;
use tetra_registry::RegistryError;
use thiserror::Error;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// The errors a caller of any repository or pool can observe.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No record exists for the key, on whichever backend.
    #[error("not found")]
    NotFound,

    /// Registry misuse, including invalid references.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A pool handed to setup is unusable.
    #[error("invalid client pool: {0}")]
    InvalidClientPool(String),

    /// Setup was skipped, or the pool or session is closed.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The native driver could not establish a session.
    #[error("connect error: {0}")]
    Connect(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid statement: {0}")]
    InvalidStatement(String),

    /// An entity could not be mapped to or from a record.
    #[error("mapping error: {0}")]
    Mapping(#[from] ModelError),

    /// A native error passed through with the statement that caused it.
    #[error("{context}: {source}")]
    Backend {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl RepositoryError {
    /// Wraps a native error with the statement text and parameters.
    pub fn backend<E>(context: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        RepositoryError::Backend {
            context: context.into(),
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound)
    }

    #[must_use]
    pub fn is_invalid_reference(&self) -> bool {
        matches!(
            self,
            RepositoryError::Registry(RegistryError::InvalidReference { .. })
        )
    }

    /// Returns the native error of a backend failure, if it has type `E`.
    #[must_use]
    pub fn backend_source<E: StdError + 'static>(&self) -> Option<&E> {
        match self {
            RepositoryError::Backend { source, .. } => source.downcast_ref::<E>(),
            _ => None,
        }
    }
}

impl From<tetra_types::Error> for RepositoryError {
    fn from(err: tetra_types::Error) -> Self {
        match err {
            tetra_types::Error::InvalidKey(msg) => RepositoryError::InvalidKey(msg),
            other => RepositoryError::Mapping(ModelError::Types(other)),
        }
    }
}
