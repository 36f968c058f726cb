//! CQL adapter for Tetra.
//!
//! Statements are CQL text with `?` markers, built by [`cql`] and executed
//! through the narrow [`Session`] boundary. Point reads run at the
//! policy's single-row consistency, range reads at its multi-row
//! consistency (`ONE` and `ALL` by default).
//!
//! [`MemoryCluster`] is an in-process column-family engine behind the same
//! boundary, for tests and embedded use.

mod client;
mod config;
mod consistency;
pub mod cql;
mod memory;
mod pool;
mod repository;
mod session;

use std::sync::Arc;

use tetra_core::RepositoryResult;
use tetra_registry::{Roots, Token, Tree};

pub use client::CqlClient;
pub use config::CassandraConfig;
pub use consistency::{Consistency, ConsistencyPolicy};
pub use memory::{LoggedStatement, MemoryCluster, MemorySession};
pub use pool::CqlPool;
pub use repository::CassandraRepository;
pub use session::{Cluster, CqlError, CqlErrorKind, Query, Rows, Session};

/// Registry slot of the CQL client of a unit of work.
pub const CQL_CLIENT: Token<CqlClient> = Token::new("/tetra/cassandra/client");

pub fn register(roots: &mut Roots, client: Option<Arc<CqlClient>>) {
    roots.register(&CQL_CLIENT, client);
}

pub fn reference(tree: &Tree) -> RepositoryResult<Option<Arc<CqlClient>>> {
    Ok(tree.reference(&CQL_CLIENT)?)
}

/// # Panics
///
/// Panics if no CQL client slot is registered.
#[must_use]
pub fn must_reference(tree: &Tree) -> Option<Arc<CqlClient>> {
    tree.must_reference(&CQL_CLIENT)
}
