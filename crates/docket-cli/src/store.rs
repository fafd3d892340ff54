//! Opening the store named by the global arguments.

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing::debug;

use docket::{EngineConfig, Repository};
use docket_file::{FileCollection, FileStore};

use crate::cli::StoreArgs;

/// Per-user data directory used when `--root` is not given.
fn default_root() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "docket").context("Could not determine data directory")?;
    Ok(dirs.data_dir().join("store"))
}

fn load_config(args: &StoreArgs) -> Result<EngineConfig> {
    match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

/// A repository over `collection`.
pub fn open(args: &StoreArgs, collection: &str) -> Result<Repository<FileCollection>> {
    let root = match &args.root {
        Some(root) => root.clone(),
        None => default_root()?,
    };
    let config = load_config(args)?;

    debug!(root = %root.display(), collection, "opening store");

    let collection = FileStore::new(root)
        .collection(collection)
        .context("Invalid collection name")?;
    Ok(Repository::with_config(collection, config))
}
