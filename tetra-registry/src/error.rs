use thiserror::Error;

use crate::Path;

/// Errors raised by registry lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("path not found: {0}")]
    PathNotFound(Path),

    #[error("invalid reference at {path}: expected {expected}, registered as {found}")]
    InvalidReference {
        path: Path,
        expected: &'static str,
        found: &'static str,
    },
}

/// Result type for registry lookups.
pub type RegistryResult<T> = Result<T, RegistryError>;
