use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ConsistencyPolicy;

/// Connection settings of the CQL adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CassandraConfig {
    /// Contact points, `host` or `host:port`.
    pub hosts: Vec<String>,
    pub keyspace: String,
    pub username: String,
    pub password: String,
    pub num_conns: u32,
    pub keep_alive_ms: u64,
    pub proto_version: u8,
    pub consistency: ConsistencyPolicy,
}

impl Default for CassandraConfig {
    fn default() -> Self {
        Self {
            hosts: vec!["127.0.0.1".to_string()],
            keyspace: String::new(),
            username: String::new(),
            password: String::new(),
            num_conns: 2,
            keep_alive_ms: 0,
            proto_version: 4,
            consistency: ConsistencyPolicy::default(),
        }
    }
}

impl fmt::Display for CassandraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cassandra.Configuration hosts={} keyspace={} username={} password={} num_conns={} keep_alive_ms={} proto_version={}",
            self.hosts.join(","),
            self.keyspace,
            self.username,
            if self.password.is_empty() { "" } else { "****" },
            self.num_conns,
            self.keep_alive_ms,
            self.proto_version
        )
    }
}
