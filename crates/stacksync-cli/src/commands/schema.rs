//! Schema command implementation.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use stacksync_core::Fetcher;
use stacksync_core::schema::schema_declarations;
use stacksync_http::HttpFetcher;

use crate::config::{self, ConfigArgs};
use crate::output;

#[derive(Args, Debug)]
pub struct SchemaArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Write the schema to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn run(args: SchemaArgs) -> Result<()> {
    let config = config::load(&args.config)?;
    let fetcher = HttpFetcher::new().context("Failed to create HTTP client")?;

    let content_types = fetcher
        .fetch_content_types(&config)
        .await
        .context("Failed to fetch content types")?;

    let sdl = schema_declarations(&content_types, &config.type_prefix)
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n");

    match &args.output {
        Some(path) => {
            fs::write(path, format!("{}\n", sdl))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            output::success(&format!(
                "Wrote schema for {} content types to {}",
                content_types.len(),
                path.display()
            ));
        }
        None => println!("{}", sdl),
    }

    Ok(())
}
