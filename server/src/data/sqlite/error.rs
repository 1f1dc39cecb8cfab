//! SQLite error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqliteError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration {version} ({name}) failed: {error}")]
    MigrationFailed {
        version: i32,
        name: String,
        error: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}

impl SqliteError {
    /// Classify constraint violations on write
    ///
    /// Unique violations become `Conflict`, foreign-key violations become
    /// `InvalidReference`; anything else stays a database error.
    pub fn from_write(e: sqlx::Error, entity: &str) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return Self::Conflict(format!("{} already exists", entity));
            }
            if db.is_foreign_key_violation() {
                return Self::InvalidReference(format!(
                    "{} references a record that does not exist",
                    entity
                ));
            }
        }
        Self::Database(e)
    }
}
