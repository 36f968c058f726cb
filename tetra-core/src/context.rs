use std::time::{Duration, Instant};

use tetra_registry::Tree;

use crate::rpc::Status;

/// Per-call context: the registry tree of the current unit of work and an
/// optional deadline.
///
/// Adapters hand the context to native calls as is. Engines that support
/// deadlines check [`Context::check`] before doing work.
#[derive(Debug, Clone, Default)]
pub struct Context {
    tree: Tree,
    deadline: Option<Instant>,
}

impl Context {
    /// An empty context with no bindings and no deadline.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new(tree: Tree) -> Self {
        Self {
            tree,
            deadline: None,
        }
    }

    #[must_use]
    pub fn with_tree(mut self, tree: Tree) -> Self {
        self.tree = tree;
        self
    }

    /// Sets the deadline to `timeout` from now, unless an earlier deadline
    /// is already set.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        self.with_deadline(deadline)
    }

    /// Sets the deadline, unless an earlier one is already set.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        });
        self
    }

    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` without a deadline.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Fails with `DeadlineExceeded` once the deadline has passed.
    pub fn check(&self) -> Result<(), Status> {
        if self.is_expired() {
            Err(Status::deadline_exceeded("context deadline exceeded"))
        } else {
            Ok(())
        }
    }
}
