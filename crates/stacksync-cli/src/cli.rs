//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::nodes::NodesCommand;
use crate::commands::schema::SchemaArgs;
use crate::commands::sync::SyncArgs;

/// Sync Contentstack content into a local node store.
#[derive(Parser, Debug)]
#[command(name = "stacksync")]
#[command(author, version = env!("STACKSYNC_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Node store directory (defaults to the platform data directory)
    #[arg(long, env = "STACKSYNC_STORE", global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one sync cycle against the delivery API
    Sync(SyncArgs),

    /// Print the schema generated from the stack's content types
    Schema(SchemaArgs),

    /// Inspect the local node store
    Nodes(NodesCommand),
}
