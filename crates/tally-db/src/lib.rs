//! tally-db - Record-table database abstraction for Tally
//!
//! This crate provides the `Database` and `Driver` traits the ledger adapter
//! talks to, plus a DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod record;
pub mod traits;

pub use duckdb::{ConnectionSettings, DuckDbBackend, DuckDbDriver};
pub use error::{DbError, DbResult};
pub use record::{ColumnDef, ColumnKind, Filter, Record, TableOptions, Value};
pub use traits::{Database, Driver};
