//! Entity model for Tetra.
//!
//! Defines how a Rust struct becomes a row, a document or a mutation:
//! - [`Entity`]: a struct with a declared column mapping
//! - [`Field`]: conversion of one struct field to and from a [`Value`]
//! - [`EntityDescriptor`]: the ordered, classified field list of an entity
//!   type (scalar, nested, collection), built once per type
//! - [`Record`]: the ordered `(column, value)` list that adapters bind
//!   positionally or turn into a document
//! - [`entity!`]: generates all of the above for a struct
//!
//! Adapters only ever see descriptors and records, so the mapping is the
//! same on every backend.

mod entity;
mod error;
mod field;
mod macros;
mod record;
mod schema;

pub use entity::Entity;
pub use error::{ModelError, ModelResult};
pub use field::{Field, FieldKind};
pub use record::Record;
pub use schema::{EntityDescriptor, FieldDescriptor};
pub use tetra_types::{Blob, EntityKey, Value};
