//! Error types for tally-ledger

use tally_db::DbError;
use thiserror::Error;

/// Boxed error returned by configuration providers
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Ledger adapter errors
///
/// Driver and provider failures are carried as-is; the adapter never
/// rewrites their payloads.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// L001: Adapter constructed without a database configuration
    #[error("[L001] Database connection params should be set")]
    MissingDatabaseConfig,

    /// The configuration provider reported a failure
    #[error(transparent)]
    Provider(BoxError),

    /// Connection, table-establishment, query, insert, or remove failure
    #[error(transparent)]
    Db(#[from] DbError),

    /// L003: Config file not found
    #[error("[L003] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// L004: Config file could not be read or parsed
    #[error("[L004] Failed to parse config {path}: {message}")]
    ConfigParse { path: String, message: String },

    /// L005: Config parsed but holds an invalid value
    #[error("[L005] Invalid config: {message}")]
    ConfigInvalid { message: String },
}

/// Result type alias for LedgerError
pub type LedgerResult<T> = Result<T, LedgerError>;
