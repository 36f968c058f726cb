//! Core type definitions for Tetra.
//!
//! This crate defines the backend-agnostic vocabulary every adapter speaks:
//! - [`Value`], the opaque value carried by keys, parameters, columns and
//!   document fields
//! - [`EntityKey`], the identity of one logical record on any backend
//! - [`Blob`], a byte payload that persists as a scalar
//!
//! Nothing here knows about a particular storage engine.

mod key;
mod value;

pub use key::EntityKey;
pub use value::{Blob, Value};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting or validating values.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("value out of range for {target}: {value}")]
    OutOfRange { target: &'static str, value: String },

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
