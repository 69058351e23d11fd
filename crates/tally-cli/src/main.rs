//! Tally CLI - inspect and edit a database's migration ledger

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{mark, status, template, unmark};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        cli::Commands::Status(args) => status::execute(args, &cli.global).await,
        cli::Commands::Mark(args) => mark::execute(args, &cli.global).await,
        cli::Commands::Unmark(args) => unmark::execute(args, &cli.global).await,
        cli::Commands::Template => template::execute().await,
    }
}
