//! Mutation-based adapter for Tetra.
//!
//! Writes are [`Mutation`]s applied through the [`Database`] boundary,
//! which commits them atomically and reports the commit timestamp. Reads go
//! through a single-use [`ReadOnlyTransaction`]. `NotFound` statuses
//! become [`RepositoryError::NotFound`](tetra_core::RepositoryError::NotFound);
//! everything else passes through.
//!
//! [`MemorySpanner`] implements the boundary in process, with a declared
//! schema per table.

mod client;
mod config;
mod database;
mod memory;
mod mutation;
mod pool;
mod repository;

use std::sync::Arc;

use tetra_core::RepositoryResult;
use tetra_registry::{Roots, Token, Tree};

pub use client::{ReadOnlyTransaction, SpannerClient};
pub use config::SpannerConfig;
pub use database::{Connector, Database};
pub use memory::MemorySpanner;
pub use mutation::{Key, KeySet, Mutation, MutationOp};
pub use pool::SpannerPool;
pub use repository::{SpannerRepository, WriteMode};

/// Registry slot of the mutation client of a unit of work.
pub const SPANNER_CLIENT: Token<SpannerClient> = Token::new("/tetra/spanner/client");

pub fn register(roots: &mut Roots, client: Option<Arc<SpannerClient>>) {
    roots.register(&SPANNER_CLIENT, client);
}

pub fn reference(tree: &Tree) -> RepositoryResult<Option<Arc<SpannerClient>>> {
    Ok(tree.reference(&SPANNER_CLIENT)?)
}

/// # Panics
///
/// Panics if no mutation client slot is registered.
#[must_use]
pub fn must_reference(tree: &Tree) -> Option<Arc<SpannerClient>> {
    tree.must_reference(&SPANNER_CLIENT)
}
