//! Database trait definitions

use crate::error::DbResult;
use crate::record::{Filter, Record, TableOptions};
use async_trait::async_trait;

/// Record-table database abstraction for Tally
///
/// A handle starts unconnected. Table operations are only valid between
/// [`Database::connect`] and [`Database::close`], and only for tables that
/// are both visible and established in the current session.
///
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Restrict the tables this handle may touch.
    ///
    /// Tables passed to a later [`Database::establish`] call are always
    /// added to the visible set.
    fn restrict_tables(&mut self, tables: &[String]);

    /// Open the physical connection
    async fn connect(&mut self) -> DbResult<()>;

    /// Close the physical connection. Closing twice is a no-op.
    async fn close(&mut self) -> DbResult<()>;

    /// Create each named table if absent.
    ///
    /// With `purge: false` an existing table and its rows are left untouched.
    async fn establish(&mut self, tables: &[(String, TableOptions)]) -> DbResult<()>;

    /// Query rows matching `filter`.
    ///
    /// Returns `None` when no row matches.
    async fn query(&self, table: &str, filter: &Filter) -> DbResult<Option<Vec<Record>>>;

    /// Insert a single record
    async fn insert(&self, table: &str, record: Record) -> DbResult<()>;

    /// Delete rows matching `filter`, returning the number removed
    async fn remove(&self, table: &str, filter: &Filter) -> DbResult<usize>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

/// Constructs unconnected [`Database`] handles
pub trait Driver: Send + Sync {
    /// Connection settings accepted by this driver
    type Settings: Clone + Send + Sync + 'static;

    /// Handle type produced by this driver
    type Db: Database;

    /// Build a handle for database `name`. No I/O happens until `connect`.
    fn database(&self, name: &str, settings: Self::Settings) -> Self::Db;
}
