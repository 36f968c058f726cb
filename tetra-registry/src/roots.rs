use std::any::{Any, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::{Path, Token, Tree};

/// One registered value, type-erased.
///
/// `value` always holds an `Option<Arc<T>>` for the `T` named by
/// `type_name`, so `T` may be unsized (`dyn Trait`).
#[derive(Clone)]
pub(crate) struct Binding {
    pub(crate) value: Arc<dyn Any + Send + Sync>,
    pub(crate) type_name: &'static str,
}

/// The write-many root table, configured at startup.
#[derive(Clone, Default)]
pub struct Roots {
    bindings: HashMap<Path, Binding>,
}

impl Roots {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `value` to the token's path. `None` registers the path as
    /// configured but empty. Registering a path again replaces the earlier
    /// binding.
    pub fn register<T>(&mut self, token: &Token<T>, value: Option<Arc<T>>) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        debug!(
            "Registering {} (type={}, empty={})",
            token.path(),
            type_name::<T>(),
            value.is_none()
        );
        self.bindings.insert(
            token.path().clone(),
            Binding {
                value: Arc::new(value),
                type_name: type_name::<T>(),
            },
        );
        self
    }

    /// Binds an owned value.
    pub fn register_value<T>(&mut self, token: &Token<T>, value: T) -> &mut Self
    where
        T: Send + Sync + 'static,
    {
        self.register(token, Some(Arc::new(value)))
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

    /// Derives a read-only tree holding every current binding. Later
    /// registrations on the roots do not affect trees already derived.
    #[must_use]
    pub fn new_tree_default(&self) -> Tree {
        Tree::from_bindings(self.bindings.clone())
    }
}

impl std::fmt::Debug for Roots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut paths: Vec<&Path> = self.bindings.keys().collect();
        paths.sort();
        f.debug_struct("Roots").field("paths", &paths).finish()
    }
}
