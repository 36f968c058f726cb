use std::fmt;

use serde::{Deserialize, Serialize};

/// Connection settings of the document store adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirestoreConfig {
    pub project_id: String,
    /// `host:port` of an emulator; empty for the real service.
    pub emulator_host: String,
    pub credentials_file: String,
}

impl fmt::Display for FirestoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "firestore.Configuration project_id={} emulator_host={} credentials_file={}",
            self.project_id, self.emulator_host, self.credentials_file
        )
    }
}
