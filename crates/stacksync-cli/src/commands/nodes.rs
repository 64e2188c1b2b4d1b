//! Node store inspection commands.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use stacksync_core::{NodeId, NodeStore};
use stacksync_file::FileStore;

use crate::output;

#[derive(Args, Debug)]
pub struct NodesCommand {
    #[command(subcommand)]
    pub command: NodesSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum NodesSubcommand {
    /// List stored nodes, one JSON object per line
    List(ListArgs),

    /// Fetch a single node
    Get(GetArgs),

    /// Show the create/delete journal
    Journal,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only nodes of this type, e.g. Contentstack_blog_post
    #[arg(long = "type")]
    pub type_name: Option<String>,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Node id
    pub id: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub fn handle(cmd: NodesCommand, store_root: &Path) -> Result<()> {
    let store = FileStore::new(store_root);
    match cmd.command {
        NodesSubcommand::List(args) => list(&store, args),
        NodesSubcommand::Get(args) => get(&store, args),
        NodesSubcommand::Journal => journal(&store),
    }
}

fn list(store: &FileStore, args: ListArgs) -> Result<()> {
    let nodes = store.get_nodes().context("Failed to read node store")?;
    let nodes: Vec<_> = nodes
        .into_iter()
        .filter(|n| args.type_name.as_deref().is_none_or(|t| n.type_name() == t))
        .collect();

    if nodes.is_empty() {
        eprintln!("{}", "No nodes found.".dimmed());
        return Ok(());
    }

    for node in &nodes {
        output::json(node)?;
    }
    Ok(())
}

fn get(store: &FileStore, args: GetArgs) -> Result<()> {
    let node = store
        .get_node(&NodeId::new(&args.id))
        .context("Failed to read node store")?
        .with_context(|| format!("Node {} not found", args.id))?;

    if args.pretty {
        output::json_pretty(&node)
    } else {
        output::json(&node)
    }
}

fn journal(store: &FileStore) -> Result<()> {
    let entries = store.journal().context("Failed to read journal")?;
    if entries.is_empty() {
        eprintln!("{}", "Journal is empty.".dimmed());
        return Ok(());
    }
    for entry in &entries {
        output::json(entry)?;
    }
    Ok(())
}
