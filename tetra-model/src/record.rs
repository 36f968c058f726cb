use std::collections::BTreeMap;

use tetra_types::Value;

use crate::{Field, ModelResult};

/// An ordered list of `(column, value)` pairs.
///
/// The order is the binding order of generated statements. Document stores
/// use [`Record::into_document`] and [`Record::from_document`] instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Appends a column. A repeated column replaces the earlier value in place.
    pub fn push(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    /// Appends a column only if the record does not have it yet.
    pub fn push_if_absent(&mut self, column: &str, value: Value) {
        if self.get(column).is_none() {
            self.entries.push((column.to_string(), value));
        }
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    /// Removes a column and returns its value, or `Value::Null` if absent.
    pub fn take(&mut self, column: &str) -> Value {
        match self.entries.iter().position(|(c, _)| c == column) {
            Some(i) => self.entries.remove(i).1,
            None => Value::Null,
        }
    }

    /// Removes a column and decodes it, tagging any error with the column.
    pub fn decode<T: Field>(&mut self, column: &str) -> ModelResult<T> {
        T::from_value(self.take(column)).map_err(|e| e.in_column(column))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Splits the record into column names and values, both in order.
    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, Vec<Value>) {
        self.entries.into_iter().unzip()
    }

    #[must_use]
    pub fn into_document(self) -> BTreeMap<String, Value> {
        self.entries.into_iter().collect()
    }

    #[must_use]
    pub fn from_document(document: BTreeMap<String, Value>) -> Self {
        Self {
            entries: document.into_iter().collect(),
        }
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (column, value) in iter {
            record.push(column, value);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
