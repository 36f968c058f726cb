use std::fmt;

use serde::{Deserialize, Serialize};

/// Replica acknowledgement level of a CQL statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Consistency {
    Any,
    One,
    Two,
    Three,
    Quorum,
    All,
    LocalQuorum,
    EachQuorum,
    LocalOne,
}

impl fmt::Display for Consistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Consistency::Any => "ANY",
            Consistency::One => "ONE",
            Consistency::Two => "TWO",
            Consistency::Three => "THREE",
            Consistency::Quorum => "QUORUM",
            Consistency::All => "ALL",
            Consistency::LocalQuorum => "LOCAL_QUORUM",
            Consistency::EachQuorum => "EACH_QUORUM",
            Consistency::LocalOne => "LOCAL_ONE",
        };
        f.write_str(name)
    }
}

/// Consistency per kind of operation.
///
/// Point lookups favour availability, range scans favour completeness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsistencyPolicy {
    pub single_row: Consistency,
    pub multi_row: Consistency,
    pub write: Consistency,
}

impl Default for ConsistencyPolicy {
    fn default() -> Self {
        Self {
            single_row: Consistency::One,
            multi_row: Consistency::All,
            write: Consistency::Quorum,
        }
    }
}
