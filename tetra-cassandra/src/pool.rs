use std::sync::Arc;

use tetra_core::{ClientPool, RepositoryError, RepositoryResult};
use tetra_registry::Token;
use tracing::{debug, info};

use crate::{CQL_CLIENT, CassandraConfig, Cluster, CqlClient, Session};

/// Owns the one CQL session of an application.
pub struct CqlPool {
    config: CassandraConfig,
    session: Arc<dyn Session>,
}

impl CqlPool {
    /// Creates the session. Unreachable hosts, bad credentials and unknown
    /// keyspaces fail here with `Connect`.
    pub fn setup(config: CassandraConfig, cluster: &dyn Cluster) -> RepositoryResult<Self> {
        info!("Configuring cassandra cluster: {}", config);
        let session = cluster
            .create_session(&config)
            .map_err(|e| RepositoryError::Connect(format!("cassandra create session failed: {e}")))?;
        info!("Cassandra driver configured (keyspace={})", config.keyspace);
        Ok(Self { config, session })
    }

    /// Wraps an already open session.
    #[must_use]
    pub fn from_session(config: CassandraConfig, session: Arc<dyn Session>) -> Self {
        Self { config, session }
    }

    #[must_use]
    pub fn config(&self) -> &CassandraConfig {
        &self.config
    }
}

impl ClientPool for CqlPool {
    type Client = CqlClient;
    const CLIENT: Token<CqlClient> = CQL_CLIENT;

    fn get(&self) -> RepositoryResult<Arc<CqlClient>> {
        if self.session.is_closed() {
            return Err(RepositoryError::InvalidState("cassandra session is closed".into()));
        }
        debug!("Acquired cql client (keyspace={})", self.config.keyspace);
        Ok(Arc::new(CqlClient::new(
            Arc::clone(&self.session),
            self.config.consistency,
        )))
    }

    fn close(&self) -> RepositoryResult<()> {
        info!("Closing cassandra session: {}", self.config);
        self.session.close();
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.session.is_closed()
    }
}
