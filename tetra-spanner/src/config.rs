use std::fmt;

use serde::{Deserialize, Serialize};

/// Connection settings of the mutation adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpannerConfig {
    pub project: String,
    pub instance: String,
    pub database: String,
    pub max_sessions: u32,
    pub keep_alive_ms: u64,
}

impl Default for SpannerConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            instance: String::new(),
            database: String::new(),
            max_sessions: 100,
            keep_alive_ms: 50 * 60 * 1000,
        }
    }
}

impl SpannerConfig {
    /// `projects/{project}/instances/{instance}/databases/{database}`.
    #[must_use]
    pub fn database_path(&self) -> String {
        format!(
            "projects/{}/instances/{}/databases/{}",
            self.project, self.instance, self.database
        )
    }
}

impl fmt::Display for SpannerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "spanner.Configuration database={} max_sessions={} keep_alive_ms={}",
            self.database_path(),
            self.max_sessions,
            self.keep_alive_ms
        )
    }
}
