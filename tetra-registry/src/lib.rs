//! Resource registry for Tetra.
//!
//! A [`Roots`] table is built once at startup: each [`Token`] path is bound
//! to one shared value, or explicitly to nothing. Every unit of work then
//! derives a [`Tree`], a cheap read-only view over the same bindings, and
//! looks resources up through it.
//!
//! Lookups distinguish three outcomes:
//! - the path was never registered: [`RegistryError::PathNotFound`]
//! - the path was registered as empty: `Ok(None)`
//! - the path holds a value of another type: [`RegistryError::InvalidReference`]
//!
//! The tree does not own what it points to. Closing clients and pools stays
//! with whoever created them.

mod error;
mod path;
mod roots;
mod tree;

pub use error::{RegistryError, RegistryResult};
pub use path::{Path, Token};
pub use roots::Roots;
pub use tree::Tree;
