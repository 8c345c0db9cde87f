//! Unified error type for data layer
//!
//! Wraps backend-specific errors while preserving which backend produced them.

use thiserror::Error;

use super::sqlite::SqliteError;

/// Unified error type for data layer operations
#[derive(Error, Debug)]
pub enum DataError {
    /// SQLite database error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    /// Migration failed
    #[error("Migration {version} ({name}) failed on {backend}: {error}")]
    MigrationFailed {
        backend: &'static str,
        version: i32,
        name: String,
        error: String,
    },

    /// Backend not available
    #[error("Backend {backend} is not available: {reason}")]
    BackendUnavailable {
        backend: &'static str,
        reason: String,
    },
}

impl DataError {
    /// Create a backend unavailable error
    pub fn backend_unavailable(backend: &'static str, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            backend,
            reason: reason.into(),
        }
    }
}

impl From<SqliteError> for DataError {
    fn from(e: SqliteError) -> Self {
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
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_sqlite_migration_error_keeps_context() {
        let err: DataError = SqliteError::MigrationFailed {
            version: 1,
            name: "initial_schema".to_string(),
            error: "syntax error".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Migration 1 (initial_schema) failed on sqlite: syntax error"
        );
    }

    #[test]
    fn test_from_sqlite_database_error() {
        let err: DataError = SqliteError::Database(sqlx::Error::PoolClosed).into();
        assert!(matches!(err, DataError::Sqlite(sqlx::Error::PoolClosed)));
    }

    #[test]
    fn test_backend_unavailable_display() {
        let err = DataError::backend_unavailable("memory", "sink closed");
        assert_eq!(
            err.to_string(),
            "Backend memory is not available: sink closed"
        );
    }
}
