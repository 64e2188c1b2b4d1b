//! stacksync - sync a Contentstack stack into a local node store.
//!
//! A thin wrapper over `stacksync-core`, wiring the HTTP fetcher to the
//! file-backed store.

mod cli;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::{nodes, schema, sync};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let store = config::store_root(cli.store.as_deref())?;

    match cli.command {
        Commands::Sync(args) => sync::run(args, &store).await,
        Commands::Schema(args) => schema::run(args).await,
        Commands::Nodes(cmd) => nodes::handle(cmd, &store),
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
