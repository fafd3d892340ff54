//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::commands::Command;

/// Query and administer a file-backed docket store.
#[derive(Parser, Debug)]
#[command(name = "docket")]
#[command(author, version = env!("DOCKET_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub store: StoreArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Where the store lives and how the engine is configured.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Store root directory (defaults to the per-user data directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// JSON engine configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}
