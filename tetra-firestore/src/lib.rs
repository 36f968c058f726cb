//! Document store adapter for Tetra.
//!
//! Entities are stored as documents at `entity_name/value`. Every call goes
//! through the [`DocumentStore`] boundary with the caller's [`Context`], so
//! deadlines reach the store untouched. Native failures are
//! [`Status`](tetra_core::Status) values; `NotFound` is normalized by the
//! client and the repository.
//!
//! [`MemoryFirestore`] implements the boundary in process.
//!
//! [`Context`]: tetra_core::Context

mod client;
mod config;
mod memory;
mod path;
mod pool;
mod repository;
mod store;

use std::sync::Arc;

use tetra_core::RepositoryResult;
use tetra_registry::{Roots, Token, Tree};

pub use client::{CollectionRef, DocumentRef, FirestoreClient, Query, WriteBatch};
pub use config::FirestoreConfig;
pub use memory::MemoryFirestore;
pub use pool::FirestorePool;
pub use repository::FirestoreRepository;
pub use store::{
    Connector, Direction, Document, DocumentStore, Filter, Op, SetOption, Snapshot,
    StructuredQuery, Write,
};

/// Registry slot of the document client of a unit of work.
pub const FIRESTORE_CLIENT: Token<FirestoreClient> = Token::new("/tetra/firestore/client");

pub fn register(roots: &mut Roots, client: Option<Arc<FirestoreClient>>) {
    roots.register(&FIRESTORE_CLIENT, client);
}

pub fn reference(tree: &Tree) -> RepositoryResult<Option<Arc<FirestoreClient>>> {
    Ok(tree.reference(&FIRESTORE_CLIENT)?)
}

/// # Panics
///
/// Panics if no document client slot is registered.
#[must_use]
pub fn must_reference(tree: &Tree) -> Option<Arc<FirestoreClient>> {
    tree.must_reference(&FIRESTORE_CLIENT)
}
