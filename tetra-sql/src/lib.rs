//! SQL adapter for Tetra.
//!
//! Statements are generated from an entity's descriptor and bound
//! positionally. Nested and collection fields are stored as JSON text.
//! The native boundary is the [`SqlDb`]/[`Driver`] pair; [`SqliteDriver`]
//! implements it over `rusqlite`, other engines plug in the same way.
//!
//! `Set` is an `INSERT` that falls back to `UPDATE` when the engine reports
//! a unique-constraint violation. The two steps are not atomic: two writers
//! racing on a new key both try the insert, one wins and the other updates.

mod builder;
mod client;
mod config;
mod dialect;
mod driver;
mod pool;
mod repository;
mod sqlite;

use std::sync::Arc;

use tetra_core::RepositoryResult;
use tetra_registry::{Roots, Token, Tree};

pub use builder::{Delete, Insert, Select, Update, delete_from, insert_into, select_from, update};
pub use client::SqlClient;
pub use config::{Datasource, SqlConfig};
pub use dialect::Dialect;
pub use driver::{Driver, DriverError, ExecResult, Rows, SqlDb};
pub use pool::SqlPool;
pub use repository::SqlRepository;
pub use sqlite::{SqliteDb, SqliteDriver};

/// Registry slot of the SQL client of a unit of work.
pub const SQL_CLIENT: Token<SqlClient> = Token::new("/tetra/sql/client");

pub fn register(roots: &mut Roots, client: Option<Arc<SqlClient>>) {
    roots.register(&SQL_CLIENT, client);
}

pub fn reference(tree: &Tree) -> RepositoryResult<Option<Arc<SqlClient>>> {
    Ok(tree.reference(&SQL_CLIENT)?)
}

/// # Panics
///
/// Panics if no SQL client slot is registered.
#[must_use]
pub fn must_reference(tree: &Tree) -> Option<Arc<SqlClient>> {
    tree.must_reference(&SQL_CLIENT)
}
