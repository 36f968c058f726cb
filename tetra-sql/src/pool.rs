use std::sync::Arc;

use tetra_core::{ClientPool, RepositoryError, RepositoryResult};
use tetra_registry::Token;
use tracing::{debug, info};

use crate::{Driver, SQL_CLIENT, SqlClient, SqlConfig, SqlDb};

/// Owns the one database handle of an application.
pub struct SqlPool {
    config: SqlConfig,
    db: Arc<dyn SqlDb>,
}

impl SqlPool {
    /// Opens and pings the database. Failures are `Connect` errors and are
    /// not retried.
    pub fn setup(config: SqlConfig, driver: &dyn Driver) -> RepositoryResult<Self> {
        info!("Configuring sql datasource: {}", config);
        let db = driver
            .open(&config.datasource().dsn())
            .map_err(|e| RepositoryError::Connect(format!("sql open failed: {e}")))?;
        db.ping()
            .map_err(|e| RepositoryError::Connect(format!("sql ping failed: {e}")))?;
        info!("Sql driver configured (driver={}, url={})", driver.name(), config.url);
        Ok(Self { config, db })
    }

    /// Wraps an already open handle.
    #[must_use]
    pub fn from_db(config: SqlConfig, db: Arc<dyn SqlDb>) -> Self {
        Self { config, db }
    }

    #[must_use]
    pub fn config(&self) -> &SqlConfig {
        &self.config
    }
}

impl ClientPool for SqlPool {
    type Client = SqlClient;
    const CLIENT: Token<SqlClient> = SQL_CLIENT;

    /// Pings before handing out a client, so a dead handle fails here.
    fn get(&self) -> RepositoryResult<Arc<SqlClient>> {
        if self.db.is_closed() {
            return Err(RepositoryError::InvalidState("sql pool is closed".into()));
        }
        self.db
            .ping()
            .map_err(|e| RepositoryError::backend("sql ping", e))?;
        debug!("Acquired sql client (driver={})", self.config.driver);
        Ok(Arc::new(SqlClient::new(Arc::clone(&self.db))))
    }

    fn close(&self) -> RepositoryResult<()> {
        info!("Closing sql pool: {}", self.config);
        self.db
            .close()
            .map_err(|e| RepositoryError::backend("sql close", e))
    }

    fn is_closed(&self) -> bool {
        self.db.is_closed()
    }
}
