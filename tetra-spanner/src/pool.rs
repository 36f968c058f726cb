use std::sync::Arc;

use tetra_core::{ClientPool, RepositoryError, RepositoryResult};
use tetra_registry::Token;
use tracing::{debug, info};

use crate::{Connector, Database, SPANNER_CLIENT, SpannerClient, SpannerConfig};

/// Owns the one database handle of an application.
pub struct SpannerPool {
    config: SpannerConfig,
    db: Arc<dyn Database>,
}

impl SpannerPool {
    pub fn setup(config: SpannerConfig, connector: &dyn Connector) -> RepositoryResult<Self> {
        info!("Configuring spanner client: {}", config);
        let db = connector
            .connect(&config)
            .map_err(|e| RepositoryError::Connect(format!("spanner connect failed: {e}")))?;
        info!("Spanner client configured (database={})", config.database_path());
        Ok(Self { config, db })
    }

    #[must_use]
    pub fn from_database(config: SpannerConfig, db: Arc<dyn Database>) -> Self {
        Self { config, db }
    }

    #[must_use]
    pub fn config(&self) -> &SpannerConfig {
        &self.config
    }
}

impl ClientPool for SpannerPool {
    type Client = SpannerClient;
    const CLIENT: Token<SpannerClient> = SPANNER_CLIENT;

    fn get(&self) -> RepositoryResult<Arc<SpannerClient>> {
        if self.db.is_closed() {
            return Err(RepositoryError::InvalidState("spanner client is closed".into()));
        }
        debug!("Acquired spanner client (database={})", self.config.database);
        Ok(Arc::new(SpannerClient::new(Arc::clone(&self.db))))
    }

    fn close(&self) -> RepositoryResult<()> {
        info!("Closing spanner client: {}", self.config);
        self.db.close();
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.db.is_closed()
    }
}
