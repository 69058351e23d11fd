//! Unmark command implementation

use anyhow::{Context, Result};
use tally_ledger::MigrationAdapter;

use crate::cli::{GlobalArgs, UnmarkArgs};
use crate::commands::common::{connect, finish};

/// Execute the unmark command
pub async fn execute(args: &UnmarkArgs, global: &GlobalArgs) -> Result<()> {
    let (adapter, session) = connect(global).await?;
    let result = async {
        for name in &args.names {
            adapter
                .unmark_executed(&session, name)
                .await
                .with_context(|| format!("Failed to unmark '{name}'"))?;
            println!("  Unmarked: {name}");
        }
        Ok::<_, anyhow::Error>(())
    }
    .await;
    finish(&adapter, session, result).await
}
