use std::any::type_name;
use std::collections::HashMap;
use std::sync::Arc;

use crate::roots::Binding;
use crate::{Path, RegistryError, RegistryResult, Token};

/// A read-only view over the bindings of a [`Roots`](crate::Roots) table.
///
/// Cloning is cheap and clones share the same bindings. A tree is never
/// mutated after derivation, so it can be read from many threads.
#[derive(Clone, Default)]
pub struct Tree {
    bindings: Arc<HashMap<Path, Binding>>,
}

impl Tree {
    pub(crate) fn from_bindings(bindings: HashMap<Path, Binding>) -> Self {
        Self {
            bindings: Arc::new(bindings),
        }
    }

    /// Looks up the value bound to the token's path.
    pub fn reference<T>(&self, token: &Token<T>) -> RegistryResult<Option<Arc<T>>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let binding = self
            .bindings
            .get(token.path())
            .ok_or_else(|| RegistryError::PathNotFound(token.path().clone()))?;
        binding
            .value
            .downcast_ref::<Option<Arc<T>>>()
            .cloned()
            .ok_or_else(|| RegistryError::InvalidReference {
                path: token.path().clone(),
                expected: type_name::<T>(),
                found: binding.type_name,
            })
    }

    /// Like [`Tree::reference`] but panics on lookup errors.
    ///
    /// Only for resources whose absence is a misconfiguration. A path that
    /// is registered as empty still returns `None`.
    ///
    /// # Panics
    ///
    /// Panics if the path is unregistered or holds another type.
    #[must_use]
    pub fn must_reference<T>(&self, token: &Token<T>) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        match self.reference(token) {
            Ok(value) => value,
            Err(e) => panic!("registry misconfigured: {e}"),
        }
    }

    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.bindings.contains_key(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Registered paths in sorted order.
    #[must_use]
    pub fn paths(&self) -> Vec<Path> {
        let mut paths: Vec<Path> = self.bindings.keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl std::fmt::Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree").field("paths", &self.paths()).finish()
    }
}
