//! tally-ledger - Migration ledger adapter for Tally
//!
//! Tracks which migrations have run against a database, using a table in
//! that same database as the ledger. A migration runner drives it through
//! the [`MigrationAdapter`] trait:
//!
//! ```no_run
//! use tally_db::ConnectionSettings;
//! use tally_ledger::{AdapterParams, DatabaseDescriptor, LedgerAdapter, MigrationAdapter};
//!
//! # async fn run() -> tally_ledger::LedgerResult<()> {
//! let descriptor = DatabaseDescriptor::new("app", ConnectionSettings::at("./data"));
//! let adapter = LedgerAdapter::duckdb(AdapterParams::new(descriptor))?;
//!
//! let session = adapter.connect().await?;
//! adapter.mark_executed(&session, "001-init").await?;
//! let done = adapter.executed_migration_names(&session).await?;
//! assert!(done.contains(&"001-init".to_string()));
//! adapter.disconnect(session).await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod config;
pub mod config_file;
pub mod connection;
pub mod error;
pub mod ledger;

pub use adapter::{template_path, LedgerAdapter, MigrationAdapter};
pub use config::{
    resolve_table_name, AdapterParams, ConfigSource, DatabaseDescriptor, DescriptorProvider,
    StaticProvider, DEFAULT_MIGRATION_TABLE,
};
pub use config_file::{FileProvider, LedgerConfig, DEFAULT_CONFIG_FILE};
pub use connection::Session;
pub use error::{BoxError, LedgerError, LedgerResult};
