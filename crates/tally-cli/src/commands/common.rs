//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use std::path::Path;
use tally_db::DuckDbBackend;
use tally_ledger::{AdapterParams, LedgerAdapter, MigrationAdapter, Session};

use crate::cli::GlobalArgs;

/// Session type produced by the DuckDB-backed adapter
pub(crate) type LedgerSession = Session<DuckDbBackend>;

/// Build an adapter from the config file named in the global args
pub(crate) fn load_adapter(global: &GlobalArgs) -> Result<LedgerAdapter> {
    let path = Path::new(&global.config);
    let params = AdapterParams::from_file(path)
        .with_context(|| format!("Failed to load ledger config from {}", path.display()))?;
    if global.verbose {
        println!("Using config: {}", path.display());
    }
    Ok(LedgerAdapter::duckdb(params)?)
}

/// Load the adapter and open a session against the configured database
pub(crate) async fn connect(global: &GlobalArgs) -> Result<(LedgerAdapter, LedgerSession)> {
    let adapter = load_adapter(global)?;
    let session = adapter
        .connect()
        .await
        .context("Failed to connect to the ledger database")?;
    if global.verbose {
        let table = adapter.ledger_table().await?;
        println!("Connected to '{}' (ledger table: {})", session.name(), table);
    }
    Ok((adapter, session))
}

/// Close `session`, then return `result`.
///
/// The session is closed even when the command failed; the command's error
/// takes precedence over a disconnect error.
pub(crate) async fn finish<T>(
    adapter: &LedgerAdapter,
    session: LedgerSession,
    result: Result<T>,
) -> Result<T> {
    let closed = adapter.disconnect(session).await;
    let value = result?;
    closed.context("Failed to disconnect from the ledger database")?;
    Ok(value)
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
