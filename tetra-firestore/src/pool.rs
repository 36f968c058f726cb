use std::sync::Arc;

use tetra_core::{ClientPool, RepositoryError, RepositoryResult};
use tetra_registry::Token;
use tracing::{debug, info};

use crate::{Connector, DocumentStore, FIRESTORE_CLIENT, FirestoreClient, FirestoreConfig};

/// Owns the one document store connection of an application.
pub struct FirestorePool {
    config: FirestoreConfig,
    store: Arc<dyn DocumentStore>,
}

impl FirestorePool {
    pub fn setup(config: FirestoreConfig, connector: &dyn Connector) -> RepositoryResult<Self> {
        info!("Configuring firestore client: {}", config);
        let store = connector
            .connect(&config)
            .map_err(|e| RepositoryError::Connect(format!("firestore connect failed: {e}")))?;
        info!("Firestore client configured (project_id={})", config.project_id);
        Ok(Self { config, store })
    }

    #[must_use]
    pub fn from_store(config: FirestoreConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self { config, store }
    }

    #[must_use]
    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }
}

impl ClientPool for FirestorePool {
    type Client = FirestoreClient;
    const CLIENT: Token<FirestoreClient> = FIRESTORE_CLIENT;

    fn get(&self) -> RepositoryResult<Arc<FirestoreClient>> {
        if self.store.is_closed() {
            return Err(RepositoryError::InvalidState("firestore client is closed".into()));
        }
        debug!("Acquired firestore client (project_id={})", self.config.project_id);
        Ok(Arc::new(FirestoreClient::new(Arc::clone(&self.store))))
    }

    fn close(&self) -> RepositoryResult<()> {
        info!("Closing firestore client: {}", self.config);
        self.store
            .close()
            .map_err(|e| RepositoryError::backend("firestore close", e))
    }

    fn is_closed(&self) -> bool {
        self.store.is_closed()
    }
}
