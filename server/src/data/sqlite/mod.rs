//! SQLite database service
//!
//! Single embedded store for accounts, race events and timing data. The file
//! runs in WAL mode so checkpoint readers keep working while timings are
//! written, and a background task truncates the WAL periodically.
//!
//! Schema and migrations live in `schema` / `migrations`.

pub mod error;
pub mod filters;
mod migrations;
pub mod repositories;
mod repository_impl;
pub mod schema;

pub use error::SqliteError;
pub use sqlx::SqlitePool;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use sqlx::ConnectOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::log::LevelFilter;

use crate::core::constants::{
    SQLITE_BUSY_TIMEOUT_SECS, SQLITE_CACHE_SIZE, SQLITE_CHECKPOINT_INTERVAL_SECS,
    SQLITE_DB_FILENAME, SQLITE_MAX_CONNECTIONS, SQLITE_WAL_AUTOCHECKPOINT,
};
use crate::core::storage::{AppStorage, DataSubdir};

/// Connection settings for the on-disk database
fn file_options(db_path: &Path) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        // races, timings and organizers rely on FK cascades / checks
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(SQLITE_BUSY_TIMEOUT_SECS))
        .pragma("cache_size", SQLITE_CACHE_SIZE)
        .pragma("temp_store", "MEMORY")
        .pragma("wal_autocheckpoint", SQLITE_WAL_AUTOCHECKPOINT)
        .log_statements(LevelFilter::Trace)
}

/// Owns the connection pool; created once at startup
pub struct SqliteService {
    pool: SqlitePool,
}

impl SqliteService {
    /// Open `<data_dir>/sqlite/racetime.db` (created on first run) and
    /// apply pending migrations
    pub async fn init(storage: &AppStorage) -> Result<Self, SqliteError> {
        let db_path = storage.subdir(DataSubdir::Sqlite).join(SQLITE_DB_FILENAME);

        let pool = SqlitePoolOptions::new()
            .max_connections(SQLITE_MAX_CONNECTIONS)
            .connect_with(file_options(&db_path))
            .await?;
        migrations::run_migrations(&pool).await?;

        tracing::debug!(path = %db_path.display(), "Race database opened");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Shared in-memory database with migrations applied (tests)
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self, SqliteError> {
        let pool = SqlitePool::connect(":memory:").await?;
        migrations::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Fold the WAL back into the main file
    pub async fn checkpoint(&self) -> Result<(), SqliteError> {
        sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
            .execute(&self.pool)
            .await?;
        tracing::trace!("WAL checkpoint completed");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("Race database closed");
    }

    /// Checkpoint every `SQLITE_CHECKPOINT_INTERVAL_SECS` until shutdown
    pub fn start_checkpoint_task(
        self: &Arc<Self>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let service = Arc::clone(self);
        let period = Duration::from_secs(SQLITE_CHECKPOINT_INTERVAL_SECS);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // First tick fires immediately; nothing to fold yet
            ticker.tick().await;

            loop {
                tokio::select! {
                    biased;
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            tracing::debug!("Checkpoint task stopped");
                            return;
                        }
                    }
                    _ = ticker.tick() => {
                        if let Err(e) = service.checkpoint().await {
                            tracing::warn!(error = %e, "Periodic WAL checkpoint failed");
                        }
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_database_is_created_and_migrated() {
        let dir = tempfile::tempdir().unwrap();
        let storage = AppStorage::init_at(dir.path().to_path_buf()).await.unwrap();

        let service = SqliteService::init(&storage).await.unwrap();
        assert!(
            storage
                .subdir(DataSubdir::Sqlite)
                .join(SQLITE_DB_FILENAME)
                .exists()
        );

        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'race_events'",
        )
        .fetch_one(service.pool())
        .await
        .unwrap();
        assert_eq!(tables, 1);

        service.checkpoint().await.unwrap();
        service.close().await;
    }

    #[tokio::test]
    async fn test_checkpoint_task_stops_on_shutdown() {
        let service = Arc::new(SqliteService::in_memory().await.unwrap());
        let (tx, rx) = watch::channel(false);
        let handle = service.start_checkpoint_task(rx);
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
