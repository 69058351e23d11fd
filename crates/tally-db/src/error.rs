//! Error types for tally-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Statement execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Table not established in this session (D003)
    #[error("[D003] Table not found: {0}")]
    TableNotFound(String),

    /// Table outside the session's visible set (D004)
    #[error("[D004] Table '{0}' is not visible in this session")]
    TableNotVisible(String),

    /// Unique or primary key violation (D005)
    #[error("[D005] Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Operation attempted before `connect` or after `close` (D006)
    #[error("[D006] Database '{0}' is not connected")]
    NotConnected(String),

    /// Mutex poisoned (D007)
    #[error("[D007] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error does not expose structured variants for constraint
        // or catalog failures, so classify by message.
        let msg = err.to_string();
        if msg.contains("Constraint Error") || msg.contains("violates unique constraint") {
            DbError::ConstraintViolation(msg)
        } else if msg.contains("Table with name")
            || (msg.contains("Catalog Error") && msg.contains("Table") && msg.contains("not exist"))
        {
            DbError::TableNotFound(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}
