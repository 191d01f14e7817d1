//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// dbversion - bring a database to the latest numbered schema version
#[derive(Parser, Debug)]
#[command(name = "dbv")]
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

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override the database path from the config (relative to the project directory)
    #[arg(long, global = true, env = "DBV_DATABASE")]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply every pending migration
    Migrate(MigrateArgs),

    /// Show the current version, lock state and pending migrations
    Status(StatusArgs),

    /// Clear a lock left behind by a killed migration run
    Unlock(UnlockArgs),
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// List the migrations that would run without applying them
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: StatusOutput,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutput {
    /// Human-readable summary
    Text,
    /// Machine-readable JSON
    Json,
}

/// Arguments for the unlock command
#[derive(Args, Debug)]
pub struct UnlockArgs {}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
