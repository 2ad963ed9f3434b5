//! Command-line interface definitions.

pub mod check;
pub mod output;
pub mod run;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::app::FailurePolicy;

/// Bookmaker - ledger order-book bootstrap and seeding.
#[derive(Parser, Debug)]
#[command(name = "bookmaker")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the config file
    #[arg(short, long, default_value = "bookmaker.toml", global = true)]
    pub config: PathBuf,

    /// Override the configured log level
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the bootstrap (foreground)
    Run(RunArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Emit JSON logs
    #[arg(long)]
    pub json_logs: bool,

    /// Override the failure policy
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Place the offers at the configured prices, without tick jitter
    #[arg(long)]
    pub no_jitter: bool,
}

/// Failure policy override for the command line.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum PolicyArg {
    /// Stop scheduling after the first failed barrier
    Abort,
    /// Keep driving the surviving accounts
    BestEffort,
}

impl From<PolicyArg> for FailurePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Abort => Self::AbortOnFailure,
            PolicyArg::BestEffort => Self::BestEffort,
        }
    }
}

/// Subcommands for `bookmaker check`
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration file
    Config,
    /// Check that the configured gateway endpoint answers
    Connection,
}
