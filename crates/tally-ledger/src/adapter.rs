//! The migration-ledger adapter and the contract a migration runner drives

use crate::config::{resolve_table_name, AdapterParams, DatabaseDescriptor, DescriptorProvider};
use crate::connection::{open_session, Session};
use crate::error::{LedgerError, LedgerResult};
use crate::ledger;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tally_db::{Driver, DuckDbDriver};

/// Bundled migration template, relative to this crate
const TEMPLATE_FILE: &str = "templates/migration.sql";

/// Location of the bundled migration file template. Needs no configuration.
pub fn template_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(TEMPLATE_FILE)
}

/// Operations a migration runner needs from a ledger.
///
/// A session is obtained from `connect`, passed by reference to the ledger
/// operations, and handed back to `disconnect`. Callers serialize calls
/// against one session.
#[async_trait]
pub trait MigrationAdapter: Send + Sync {
    /// Live session type handed to the runner
    type Session: Send + Sync;

    /// Open a session and make sure the ledger table exists
    async fn connect(&self) -> LedgerResult<Self::Session>;

    /// Close a session returned by `connect`
    async fn disconnect(&self, session: Self::Session) -> LedgerResult<()>;

    /// Names of every migration marked executed, in store order
    async fn executed_migration_names(&self, session: &Self::Session) -> LedgerResult<Vec<String>>;

    /// Record `name` as executed. Marking the same name twice is an error.
    async fn mark_executed(&self, session: &Self::Session, name: &str) -> LedgerResult<()>;

    /// Forget `name`. Succeeds when it was never marked.
    async fn unmark_executed(&self, session: &Self::Session, name: &str) -> LedgerResult<()>;

    /// Location of the migration file template
    fn template_path(&self) -> PathBuf;
}

/// Ledger adapter backed by a [`Driver`]
pub struct LedgerAdapter<D: Driver = DuckDbDriver> {
    driver: D,
    provider: Arc<dyn DescriptorProvider<D::Settings>>,
    tables: Option<Vec<String>>,
}

impl LedgerAdapter<DuckDbDriver> {
    /// Adapter over DuckDB
    pub fn duckdb(params: AdapterParams) -> LedgerResult<Self> {
        Self::with_driver(DuckDbDriver, params)
    }
}

impl<D: Driver> LedgerAdapter<D> {
    /// Build an adapter; fails before any I/O when no database config is given
    pub fn with_driver(driver: D, params: AdapterParams<D::Settings>) -> LedgerResult<Self> {
        let source = params.database.ok_or(LedgerError::MissingDatabaseConfig)?;
        Ok(Self {
            driver,
            provider: source.into_provider(),
            tables: params.tables,
        })
    }

    /// Tables the session is restricted to, if any
    pub fn tables(&self) -> Option<&[String]> {
        self.tables.as_deref()
    }

    /// Ask the provider for the current descriptor
    pub async fn resolve(&self) -> LedgerResult<DatabaseDescriptor<D::Settings>> {
        self.provider.resolve().await.map_err(LedgerError::Provider)
    }

    /// Ledger table for the current descriptor
    pub async fn ledger_table(&self) -> LedgerResult<String> {
        let descriptor = self.resolve().await?;
        Ok(resolve_table_name(&descriptor))
    }
}

#[async_trait]
impl<D: Driver> MigrationAdapter for LedgerAdapter<D> {
    type Session = Session<D::Db>;

    async fn connect(&self) -> LedgerResult<Self::Session> {
        let descriptor = self.resolve().await?;
        open_session(&self.driver, &descriptor, self.tables()).await
    }

    async fn disconnect(&self, session: Self::Session) -> LedgerResult<()> {
        let name = session.name().to_string();
        session.close().await?;
        log::debug!("Disconnected from '{name}'");
        Ok(())
    }

    async fn executed_migration_names(&self, session: &Self::Session) -> LedgerResult<Vec<String>> {
        let table = self.ledger_table().await?;
        Ok(ledger::executed_names(session.database(), &table).await?)
    }

    async fn mark_executed(&self, session: &Self::Session, name: &str) -> LedgerResult<()> {
        let table = self.ledger_table().await?;
        Ok(ledger::mark(session.database(), &table, name).await?)
    }

    async fn unmark_executed(&self, session: &Self::Session, name: &str) -> LedgerResult<()> {
        let table = self.ledger_table().await?;
        Ok(ledger::unmark(session.database(), &table, name).await?)
    }

    fn template_path(&self) -> PathBuf {
        template_path()
    }
}

#[cfg(test)]
#[path = "adapter_test.rs"]
mod tests;
