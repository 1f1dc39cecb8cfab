//! Unified error type for data layer
//!
//! Wraps backend errors so handlers depend only on `DataError`.

use thiserror::Error;

/// Unified error type for data layer operations
#[derive(Error, Debug)]
pub enum DataError {
    /// SQLite database error
    #[error("SQLite error: {0}")]
    Sqlite(sqlx::Error),

    /// Migration failed
    #[error("Migration {version} ({name}) failed on {backend}: {error}")]
    MigrationFailed {
        backend: &'static str,
        version: i32,
        name: String,
        error: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Duplicate entry (unique constraint)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Write referenced a missing related record
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Search filter the backend cannot evaluate
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}

impl DataError {
    /// Check if this is a connection-related error that might be transient
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Sqlite(e) => matches!(
                e,
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            ),
            _ => false,
        }
    }
}

impl From<crate::data::sqlite::SqliteError> for DataError {
    fn from(e: crate::data::sqlite::SqliteError) -> Self {
        use crate::data::sqlite::SqliteError;
        match e {
            SqliteError::Database(e) => Self::Sqlite(e),
            SqliteError::MigrationFailed {
                version,
                name,
                error,
            } => Self::MigrationFailed {
                backend: "sqlite",
                version,
                name,
                error,
            },
            SqliteError::Io(e) => Self::Io(e),
            SqliteError::Conflict(msg) => Self::Conflict(msg),
            SqliteError::InvalidReference(msg) => Self::InvalidReference(msg),
            SqliteError::InvalidFilter(msg) => Self::InvalidFilter(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::SqliteError;

    #[test]
    fn test_migration_failed_error_display() {
        let err: DataError = SqliteError::MigrationFailed {
            version: 2,
            name: "add_race_search_indexes".into(),
            error: "syntax error".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Migration 2 (add_race_search_indexes) failed on sqlite: syntax error"
        );
    }

    #[test]
    fn test_from_sqlite_preserves_kind() {
        let err: DataError = SqliteError::Conflict("Participant already exists".into()).into();
        assert!(matches!(err, DataError::Conflict(_)));

        let err: DataError = SqliteError::InvalidFilter("bad".into()).into();
        assert!(matches!(err, DataError::InvalidFilter(_)));

        let err: DataError = SqliteError::InvalidReference("Race".into()).into();
        assert!(matches!(err, DataError::InvalidReference(_)));
    }

    #[test]
    fn test_is_transient() {
        assert!(DataError::Sqlite(sqlx::Error::PoolTimedOut).is_transient());
        assert!(!DataError::Sqlite(sqlx::Error::RowNotFound).is_transient());
        assert!(!DataError::Conflict("dup".into()).is_transient());
    }
}
