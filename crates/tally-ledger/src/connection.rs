//! Session lifecycle: open a connection and establish the ledger table

use crate::config::{resolve_table_name, DatabaseDescriptor};
use crate::error::LedgerResult;
use crate::ledger::ledger_table_options;
use tally_db::{Database, DbResult, Driver};

/// A live, connected database handle.
///
/// Returned by `connect` and consumed by `disconnect`; ledger operations
/// borrow it in between.
pub struct Session<Db> {
    db: Db,
    database: String,
}

impl<Db: Database> Session<Db> {
    /// The connected handle, for work outside the ledger
    pub fn database(&self) -> &Db {
        &self.db
    }

    /// Mutable access, e.g. to establish additional tables
    pub fn database_mut(&mut self) -> &mut Db {
        &mut self.db
    }

    /// Database identity this session was opened against
    pub fn name(&self) -> &str {
        &self.database
    }

    pub(crate) async fn close(mut self) -> DbResult<()> {
        self.db.close().await
    }
}

impl<Db> std::fmt::Debug for Session<Db> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}

/// Open a session for `descriptor` and make sure its ledger table exists.
///
/// Nothing is retained on failure: a handle whose ledger table could not be
/// established is closed before the error is returned.
pub(crate) async fn open_session<D: Driver>(
    driver: &D,
    descriptor: &DatabaseDescriptor<D::Settings>,
    tables: Option<&[String]>,
) -> LedgerResult<Session<D::Db>> {
    let table = resolve_table_name(descriptor);
    // The driver gets its own copy; later edits to the caller's settings
    // never reach an open session.
    let settings = descriptor.connection.clone();

    let mut db = driver.database(&descriptor.name, settings);
    if let Some(tables) = tables {
        db.restrict_tables(tables);
    }
    db.connect().await?;

    let ledger = [(table.clone(), ledger_table_options())];
    if let Err(err) = db.establish(&ledger).await {
        if let Err(close_err) = db.close().await {
            log::warn!(
                "Failed to close '{}' after ledger setup error: {close_err}",
                descriptor.name
            );
        }
        return Err(err.into());
    }

    log::debug!(
        "Opened {} session for '{}' with ledger table '{}'",
        db.db_type(),
        descriptor.name,
        table
    );
    Ok(Session {
        db,
        database: descriptor.name.clone(),
    })
}
