//! Data storage layer
//!
//! - `sqlite` - Transactional database (users, race events, timing)
//! - `types` - Row and parameter types shared by handlers and backends
//! - `traits` - Repository trait handlers depend on
//! - `error` - Unified error type

pub mod error;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use sqlite::SqliteService;

pub use error::DataError;

pub use traits::TransactionalRepository;

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::storage::AppStorage;

/// Transactional database service
///
/// Owns the backend service and hands out the repository used by the API.
pub struct TransactionalService {
    sqlite: Arc<SqliteService>,
}

impl TransactionalService {
    /// Open (and migrate) the database under the storage data directory
    pub async fn init(storage: &AppStorage) -> Result<Self, DataError> {
        let service = SqliteService::init(storage).await?;
        Ok(Self {
            sqlite: Arc::new(service),
        })
    }

    /// In-memory database with the current schema (tests)
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self, DataError> {
        let service = SqliteService::in_memory().await?;
        Ok(Self {
            sqlite: Arc::new(service),
        })
    }

    /// Run a WAL checkpoint
    pub async fn checkpoint(&self) -> Result<(), DataError> {
        self.sqlite.checkpoint().await.map_err(Into::into)
    }

    /// Close the database connection gracefully
    pub async fn close(&self) {
        self.sqlite.close().await
    }

    /// Start the background WAL checkpoint task
    pub fn start_checkpoint_task(&self, shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
        self.sqlite.start_checkpoint_task(shutdown_rx)
    }

    /// Repository handle for data operations
    pub fn repository(&self) -> Arc<dyn TransactionalRepository> {
        Arc::new(Arc::clone(&self.sqlite))
    }
}
