//! Status command implementation

use anyhow::Result;
use serde::Serialize;
use tally_ledger::MigrationAdapter;

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::{connect, finish};

#[derive(Debug, Serialize)]
struct StatusReport {
    database: String,
    ledger_table: String,
    executed: Vec<String>,
}

/// Execute the status command
pub async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let (adapter, session) = connect(global).await?;
    let result = async {
        let mut executed = adapter.executed_migration_names(&session).await?;
        // The ledger makes no ordering promise; sort for stable output
        executed.sort();
        Ok::<_, anyhow::Error>(StatusReport {
            database: session.name().to_string(),
            ledger_table: adapter.ledger_table().await?,
            executed,
        })
    }
    .await;
    let report = finish(&adapter, session, result).await?;

    match args.output {
        StatusOutput::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        StatusOutput::Table => print_table(&report),
    }
    Ok(())
}

fn print_table(report: &StatusReport) {
    if report.executed.is_empty() {
        println!(
            "No migrations recorded in {}.{}",
            report.database, report.ledger_table
        );
        return;
    }
    for name in &report.executed {
        println!("{name}");
    }
    println!();
    println!(
        "{} migration{} recorded in {}.{}",
        report.executed.len(),
        if report.executed.len() == 1 { "" } else { "s" },
        report.database,
        report.ledger_table
    );
}
