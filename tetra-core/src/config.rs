//! Application-level persistence configuration.
//!
//! Backend crates define their own connection settings; this module picks
//! the backend and loads any of those structs from JSON. Configuration is
//! read once at setup and never reloaded.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

/// The storage backend an application runs against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Cassandra,
    Firestore,
    Spanner,
    #[default]
    Sql,
}

impl Provider {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Cassandra => "cassandra",
            Provider::Firestore => "firestore",
            Provider::Spanner => "spanner",
            Provider::Sql => "sql",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cassandra" | "cql" => Ok(Provider::Cassandra),
            "firestore" => Ok(Provider::Firestore),
            "spanner" => Ok(Provider::Spanner),
            "sql" => Ok(Provider::Sql),
            _ => Err(ConfigError::UnknownProvider(s.to_string())),
        }
    }
}

/// Top-level persistence settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub provider: Provider,
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "persistence.Configuration provider={}", self.provider)
    }
}

/// Reads a JSON configuration file.
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> ConfigResult<T> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    from_json_str(&raw)
}

pub fn from_json_str<T: DeserializeOwned>(raw: &str) -> ConfigResult<T> {
    Ok(serde_json::from_str(raw)?)
}
