//! Repository contract and connection lifecycle for Tetra.
//!
//! # Architecture
//!
//! - [`Repository`] is the uniform `get`/`set`/`delete`/`close` contract that
//!   every backend adapter implements for any [`Entity`](tetra_model::Entity)
//! - [`RepositoryError`] is the closed error surface callers branch on; every
//!   backend's native "not found" arrives as [`RepositoryError::NotFound`]
//! - [`ClientPool`] owns one native session and hands out cheap [`Client`]
//!   views over it; closing a client never closes the session
//! - [`Persistence`] holds a pool and the registry roots, and runs units of
//!   work with the client bound into a fresh [`Tree`](tetra_registry::Tree)
//! - [`Context`] carries that tree and an optional deadline through every
//!   call, untouched by the adapters

pub mod config;
mod context;
mod error;
mod persistence;
mod pool;
mod repository;
pub mod rpc;

pub use context::Context;
pub use error::{RepositoryError, RepositoryResult};
pub use persistence::Persistence;
pub use pool::{Client, ClientPool, ClientSource};
pub use repository::{
    REPOSITORY_PATH, Repository, must_reference_repository, reference_repository,
    register_repository, repository_token,
};
pub use rpc::{Code, Status};
