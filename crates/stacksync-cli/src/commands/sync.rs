//! Sync command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use stacksync_core::Syncer;
use stacksync_file::FileStore;
use stacksync_http::HttpFetcher;

use crate::config::{self, ConfigArgs};
use crate::output;

#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Write schema.graphql into the store, regardless of configuration
    #[arg(long)]
    pub schema: bool,

    /// Print the sync report as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: SyncArgs, store_root: &Path) -> Result<()> {
    let mut config = config::load(&args.config)?;
    if args.schema {
        config.enable_schema_generation = true;
    }

    let fetcher = HttpFetcher::new().context("Failed to create HTTP client")?;
    let store = FileStore::new(store_root);

    if !args.json {
        eprintln!("{}", "Syncing...".dimmed());
    }

    let mut syncer = Syncer::new(config, fetcher, store);
    let report = syncer.run_cycle().await.context("Sync failed")?;

    if args.json {
        return output::json(&report);
    }

    let kind = if report.initial { "initial" } else { "incremental" };
    output::success(&format!("Completed {} sync", kind));
    println!();
    output::field("Entries", &report.entries_created.to_string());
    output::field("Assets", &report.assets_created.to_string());
    output::field("Content types", &report.content_types_created.to_string());
    output::field("Deleted", &report.nodes_deleted.to_string());
    output::field("Ignored", &report.ignored_events.to_string());
    output::field("Cursor", report.cursor.as_str());
    output::field("Store", &store_root.display().to_string());

    Ok(())
}
