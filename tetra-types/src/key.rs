//! Entity identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, Value};

/// Names a single persisted record: the table, collection or column family
/// (`entity_name`), the key column or field (`name`) and its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityKey {
    entity_name: String,
    name: String,
    value: Value,
}

impl EntityKey {
    #[must_use]
    pub fn new(entity_name: impl Into<String>, name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            entity_name: entity_name.into(),
            name: name.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Checks that the key can address a record at all: both names are
    /// non-empty and the value is not null.
    pub fn validate(&self) -> Result<()> {
        if self.entity_name.trim().is_empty() {
            return Err(Error::InvalidKey("entity name is empty".into()));
        }
        if self.name.trim().is_empty() {
            return Err(Error::InvalidKey(format!(
                "key name is empty for entity {}",
                self.entity_name
            )));
        }
        if self.value.is_null() {
            return Err(Error::InvalidKey(format!("{self} has a null value")));
        }
        Ok(())
    }

    /// The document path `entity_name/value` used by document stores.
    pub fn document_id(&self) -> Result<String> {
        self.validate()?;
        if self.entity_name.contains('/') {
            return Err(Error::InvalidKey(format!(
                "entity name {:?} contains '/'",
                self.entity_name
            )));
        }
        Ok(format!("{}/{}", self.entity_name, self.value.to_key_segment()?))
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}={}]", self.entity_name, self.name, self.value)
    }
}
