use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tetra_types::{Blob, Error, Value};
use uuid::Uuid;

use crate::ModelResult;

/// How a field is persisted.
///
/// Temporal types are scalars even though they are structs. Any other
/// struct (an entity, a map) is nested. Sequences are collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Persisted directly in one column.
    Scalar,
    /// A single embedded structure: a sub-document on document stores, a
    /// serialized column elsewhere.
    Nested,
    /// An array: a native list column or a serialized column.
    Collection,
}

/// Conversion of one struct field to and from a [`Value`].
pub trait Field: Sized {
    const KIND: FieldKind;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> ModelResult<Self>;
}

impl Field for bool {
    const KIND: FieldKind = FieldKind::Scalar;

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> ModelResult<Self> {
        Ok(value.into_bool()?)
    }
}

impl Field for i64 {
    const KIND: FieldKind = FieldKind::Scalar;

    fn to_value(&self) -> Value {
        Value::Int(*self)
    }

    fn from_value(value: Value) -> ModelResult<Self> {
        Ok(value.into_i64()?)
    }
}

macro_rules! narrow_int_field {
    ($($ty:ty),*) => {$(
        impl Field for $ty {
            const KIND: FieldKind = FieldKind::Scalar;

            fn to_value(&self) -> Value {
                Value::Int(i64::from(*self))
            }

            fn from_value(value: Value) -> ModelResult<Self> {
                let n = value.into_i64()?;
                <$ty>::try_from(n).map_err(|_| {
                    Error::OutOfRange {
                        target: stringify!($ty),
                        value: n.to_string(),
                    }
                    .into()
                })
            }
        }
    )*};
}

narrow_int_field!(i16, i32, u32);

impl Field for f64 {
    const KIND: FieldKind = FieldKind::Scalar;

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> ModelResult<Self> {
        Ok(value.into_f64()?)
    }
}

impl Field for f32 {
    const KIND: FieldKind = FieldKind::Scalar;

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: Value) -> ModelResult<Self> {
        Ok(value.into_f64()? as f32)
    }
}

impl Field for String {
    const KIND: FieldKind = FieldKind::Scalar;

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> ModelResult<Self> {
        Ok(value.into_string()?)
    }
}

impl Field for Blob {
    const KIND: FieldKind = FieldKind::Scalar;

    fn to_value(&self) -> Value {
        Value::Bytes(self.0.clone())
    }

    fn from_value(value: Value) -> ModelResult<Self> {
        Ok(Blob(value.into_bytes()?))
    }
}

impl Field for Uuid {
    const KIND: FieldKind = FieldKind::Scalar;

    fn to_value(&self) -> Value {
        Value::Uuid(*self)
    }

    fn from_value(value: Value) -> ModelResult<Self> {
        Ok(value.into_uuid()?)
    }
}

impl Field for DateTime<Utc> {
    const KIND: FieldKind = FieldKind::Scalar;

    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }

    fn from_value(value: Value) -> ModelResult<Self> {
        Ok(value.into_timestamp()?)
    }
}

impl<T: Field> Field for Option<T> {
    const KIND: FieldKind = T::KIND;

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, Field::to_value)
    }

    fn from_value(value: Value) -> ModelResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: Field> Field for Box<T> {
    const KIND: FieldKind = T::KIND;

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn from_value(value: Value) -> ModelResult<Self> {
        T::from_value(value).map(Box::new)
    }
}

/// A null collection decodes as empty, the way CQL treats empty lists.
impl<T: Field> Field for Vec<T> {
    const KIND: FieldKind = FieldKind::Collection;

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(Field::to_value).collect())
    }

    fn from_value(value: Value) -> ModelResult<Self> {
        match value {
            Value::Null => Ok(Vec::new()),
            other => other.into_list()?.into_iter().map(T::from_value).collect(),
        }
    }
}

impl<T: Field> Field for BTreeMap<String, T> {
    const KIND: FieldKind = FieldKind::Nested;

    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.clone(), v.to_value())).collect())
    }

    fn from_value(value: Value) -> ModelResult<Self> {
        match value {
            Value::Null => Ok(BTreeMap::new()),
            other => other
                .into_map()?
                .into_iter()
                .map(|(k, v)| T::from_value(v).map(|v| (k, v)))
                .collect(),
        }
    }
}

/// Arbitrary JSON stays nested and maps structurally onto [`Value`].
impl Field for serde_json::Value {
    const KIND: FieldKind = FieldKind::Nested;

    fn to_value(&self) -> Value {
        json_to_value(self)
    }

    fn from_value(value: Value) -> ModelResult<Self> {
        Ok(value_to_json(value))
    }
}

/// Structural conversion from JSON. Integers stay integers, other numbers
/// become floats.
fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::Text(s.clone()),
        serde_json::Value::Array(items) => Value::List(items.iter().map(json_to_value).collect()),
        serde_json::Value::Object(fields) => Value::Map(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), json_to_value(v)))
                .collect(),
        ),
    }
}

/// Structural conversion to JSON. Bytes become an array of numbers, UUIDs
/// and timestamps become strings, and non-finite floats become `null`.
fn value_to_json(value: Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(b),
        Value::Int(n) => serde_json::Value::from(n),
        Value::Float(x) => serde_json::Number::from_f64(x)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::Text(s) => serde_json::Value::String(s),
        Value::Bytes(b) => serde_json::Value::from(b),
        Value::Uuid(u) => serde_json::Value::String(u.to_string()),
        Value::Timestamp(t) => serde_json::Value::String(t.to_rfc3339()),
        Value::List(items) => serde_json::Value::Array(items.into_iter().map(value_to_json).collect()),
        Value::Map(fields) => serde_json::Value::Object(
            fields.into_iter().map(|(k, v)| (k, value_to_json(v))).collect(),
        ),
    }
}

