//! CLI command implementations

pub mod build;
pub mod config;
pub mod list;
pub mod prune;

pub use build::execute as build;
pub use config::execute as config;
pub use list::execute as list;
pub use prune::execute as prune;

use crate::cli::args::StoreArgs;
use crate::config::{Config, ConfigManager};
use crate::error::{EmbedCacheError, EmbedCacheResult};
use crate::store::{PersistentStore, StoreConfig};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Canonical project root, defaulting to the current directory
pub(crate) fn resolve_root(root: Option<PathBuf>) -> EmbedCacheResult<PathBuf> {
    let root = match root {
        Some(root) => root,
        None => std::env::current_dir()
            .map_err(|e| EmbedCacheError::io("getting current directory", e))?,
    };

    root.canonicalize()
        .map_err(|e| EmbedCacheError::PathInvalid {
            path: root.clone(),
            reason: e.to_string(),
        })
}

/// Store locations from flags, falling back to config; relative paths
/// resolve against the project root
pub(crate) fn store_config(root: &Path, args: &StoreArgs, config: &Config) -> StoreConfig {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config.store.output_path.clone());
    let staging = args
        .staging
        .clone()
        .or_else(|| config.store.staging_path.clone());

    let mut store = StoreConfig::new(root.join(output));
    if let Some(staging) = staging {
        store = store.with_staging_path(root.join(staging));
    }
    store
}

pub(crate) fn open_store(root: &Path, args: &StoreArgs, config: &Config) -> PersistentStore {
    PersistentStore::new(store_config(root, args, config))
}

/// Secondary cache directory for a project.
///
/// The shared default directory is split per project root, since
/// identifiers are only unique within one root.
pub(crate) fn secondary_dir(root: &Path, config: &Config) -> PathBuf {
    if let Some(ref dir) = config.secondary.dir {
        return root.join(dir);
    }

    let digest = Sha256::digest(root.to_string_lossy().as_bytes());
    ConfigManager::default_cache_dir().join(&hex::encode(digest)[..16])
}
