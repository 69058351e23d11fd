//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Tally - inspect and edit a database's migration ledger
#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the ledger config file
    #[arg(
        short,
        long,
        global = true,
        env = "TALLY_CONFIG",
        default_value = tally_ledger::DEFAULT_CONFIG_FILE
    )]
    pub config: String,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List migrations recorded as executed
    Status(StatusArgs),

    /// Record a migration as executed
    Mark(MarkArgs),

    /// Forget that a migration was executed
    Unmark(UnmarkArgs),

    /// Print the path of the migration file template
    Template,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: StatusOutput,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutput {
    /// One name per line
    Table,
    /// JSON document
    Json,
}

/// Arguments for the mark command
#[derive(Args, Debug)]
pub struct MarkArgs {
    /// Migration names to record
    #[arg(required = true)]
    pub names: Vec<String>,
}

/// Arguments for the unmark command
#[derive(Args, Debug)]
pub struct UnmarkArgs {
    /// Migration names to forget
    #[arg(required = true)]
    pub names: Vec<String>,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
