//! Mark command implementation

use anyhow::{Context, Result};
use tally_ledger::MigrationAdapter;

use crate::cli::{GlobalArgs, MarkArgs};
use crate::commands::common::{connect, finish};

/// Execute the mark command
pub async fn execute(args: &MarkArgs, global: &GlobalArgs) -> Result<()> {
    let (adapter, session) = connect(global).await?;
    let result = async {
        for name in &args.names {
            adapter
                .mark_executed(&session, name)
                .await
                .with_context(|| format!("Failed to mark '{name}' as executed"))?;
            println!("  Marked: {name}");
        }
        Ok::<_, anyhow::Error>(())
    }
    .await;
    finish(&adapter, session, result).await
}
