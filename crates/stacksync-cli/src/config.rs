//! Configuration and store location.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use directories::ProjectDirs;
use tracing::debug;

use stacksync_core::{SyncConfig, TypePrefix};

/// Options shared by commands that talk to the delivery API.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// JSON configuration file
    #[arg(short, long, env = "STACKSYNC_CONFIG", default_value = "stacksync.json")]
    pub config: PathBuf,

    /// Stack api key, overriding the configuration file
    #[arg(long, env = "STACKSYNC_API_KEY")]
    pub api_key: Option<String>,

    /// Type prefix for generated node types
    #[arg(long)]
    pub type_prefix: Option<String>,

    /// Delivery API base URL, overriding the configuration file
    #[arg(long)]
    pub cdn: Option<String>,
}

/// Load configuration from the file named in `args`, then apply overrides.
///
/// A missing file is only an error when no `--api-key` is given.
pub fn load(args: &ConfigArgs) -> Result<SyncConfig> {
    let mut config = match read_file(&args.config)? {
        Some(config) => config,
        None => {
            let api_key = args.api_key.as_deref().with_context(|| {
                format!(
                    "Config file {} not found and no --api-key given",
                    args.config.display()
                )
            })?;
            SyncConfig::new(api_key)
        }
    };

    if let Some(api_key) = &args.api_key {
        config.api_key = api_key.clone();
    }
    if let Some(prefix) = &args.type_prefix {
        config.type_prefix = TypePrefix::new(prefix).context("Invalid type prefix")?;
    }
    if let Some(cdn) = &args.cdn {
        config = config.with_option("cdn", cdn.as_str());
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<Option<SyncConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config = SyncConfig::from_json(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    debug!(path = %path.display(), api_key = %config.api_key, "Loaded configuration");
    Ok(Some(config))
}

/// The store directory: the explicit one, or `store/` under the data directory.
pub fn store_root(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let dirs =
        ProjectDirs::from("", "", "stacksync").context("Could not determine data directory")?;
    Ok(dirs.data_dir().join("store"))
}
