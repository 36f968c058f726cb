use serde::Serialize;

use crate::FieldKind;

/// One persisted field of an entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    /// Struct field name.
    pub name: &'static str,
    /// Column, document field or mutation column name.
    pub column: &'static str,
    pub kind: FieldKind,
    /// Declared Rust type, for diagnostics.
    pub type_name: &'static str,
}

/// The ordered, classified field list of an entity type.
///
/// Field order is declaration order, so positional parameter binding in
/// generated statements is stable across calls. An entity with no fields
/// yields an empty descriptor; statements built from it touch zero columns
/// and are rejected by the backend, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityDescriptor {
    type_name: &'static str,
    fields: Vec<FieldDescriptor>,
    transient: Vec<&'static str>,
}

impl EntityDescriptor {
    #[must_use]
    pub fn new(
        type_name: &'static str,
        fields: Vec<FieldDescriptor>,
        transient: Vec<&'static str>,
    ) -> Self {
        Self {
            type_name,
            fields,
            transient,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// All persisted fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Persisted column names in declaration order.
    #[must_use]
    pub fn columns(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.column).collect()
    }

    pub fn scalars(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.of_kind(FieldKind::Scalar)
    }

    pub fn nesteds(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.of_kind(FieldKind::Nested)
    }

    pub fn collections(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.of_kind(FieldKind::Collection)
    }

    /// Fields declared on the struct but never persisted.
    #[must_use]
    pub fn transient(&self) -> &[&'static str] {
        &self.transient
    }

    /// Looks up a persisted field by column name.
    #[must_use]
    pub fn field(&self, column: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.column == column)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn of_kind(&self, kind: FieldKind) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(move |f| f.kind == kind)
    }
}
