//! JSON-backed persistent store with staged, atomic publication

use crate::error::{EmbedCacheError, EmbedCacheResult};
use crate::store::snapshot::Snapshot;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Locations used by the persistent store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Final durable document
    pub output_path: PathBuf,

    /// Transient location written before the atomic rename.
    /// When unset a unique file next to `output_path` is used.
    pub staging_path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            staging_path: None,
        }
    }

    pub fn with_staging_path(mut self, staging_path: impl Into<PathBuf>) -> Self {
        self.staging_path = Some(staging_path.into());
        self
    }
}

/// Owner of every file-system mutation of the durable store
#[derive(Debug, Clone)]
pub struct PersistentStore {
    output_path: PathBuf,
    staging_path: PathBuf,
}

impl PersistentStore {
    /// Create a store. Without an explicit staging path, each store gets its
    /// own `<output>.<uuid>.tmp` sibling so concurrent sessions never share one.
    pub fn new(config: StoreConfig) -> Self {
        let staging_path = config
            .staging_path
            .unwrap_or_else(|| Self::unique_staging_path(&config.output_path));

        Self {
            output_path: config.output_path,
            staging_path,
        }
    }

    fn unique_staging_path(output_path: &Path) -> PathBuf {
        let file_name = output_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "embeddings.json".to_string());

        output_path.with_file_name(format!("{}.{}.tmp", file_name, Uuid::new_v4().simple()))
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn staging_path(&self) -> &Path {
        &self.staging_path
    }

    /// Load the durable snapshot.
    ///
    /// A missing, unreadable or malformed document yields an empty snapshot;
    /// a corrupt cache is a cold cache.
    pub fn load<V: DeserializeOwned>(&self) -> Snapshot<V> {
        let content = match fs::read_to_string(&self.output_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No store at {}, starting empty", self.output_path.display());
                return Snapshot::new();
            }
            Err(e) => {
                warn!(
                    "Failed to read store {}: {}, starting empty",
                    self.output_path.display(),
                    e
                );
                return Snapshot::new();
            }
        };

        match serde_json::from_str::<Snapshot<V>>(&content) {
            Ok(snapshot) => {
                debug!(
                    "Loaded {} entries from {}",
                    snapshot.len(),
                    self.output_path.display()
                );
                snapshot
            }
            Err(e) => {
                warn!(
                    "Store {} is corrupt ({}), starting empty",
                    self.output_path.display(),
                    e
                );
                Snapshot::new()
            }
        }
    }

    /// Write `snapshot` to the staging location
    pub fn stage<V: Serialize>(&self, snapshot: &Snapshot<V>) -> EmbedCacheResult<()> {
        if let Some(parent) = self.staging_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    EmbedCacheError::io(format!("creating directory {}", parent.display()), e)
                })?;
            }
        }

        let content = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.staging_path, content).map_err(|e| {
            EmbedCacheError::io(
                format!("writing staged store {}", self.staging_path.display()),
                e,
            )
        })?;

        debug!(
            "Staged {} entries to {}",
            snapshot.len(),
            self.staging_path.display()
        );
        Ok(())
    }

    /// Publish the staged document over the output path.
    ///
    /// Returns whether anything was published. A missing staging file (nothing
    /// changed this session) or a failed rename leaves the previous durable
    /// document untouched.
    pub fn finalize(&self) -> bool {
        if !self.staging_path.exists() {
            debug!("Nothing staged at {}", self.staging_path.display());
            return false;
        }

        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = fs::create_dir_all(parent) {
                    warn!("Failed to create {}: {}", parent.display(), e);
                    return false;
                }
            }
        }

        match fs::rename(&self.staging_path, &self.output_path) {
            Ok(()) => {
                debug!(
                    "Moved {} to {}",
                    self.staging_path.display(),
                    self.output_path.display()
                );
                true
            }
            Err(e) => {
                warn!(
                    "Failed to move {} to {}: {}",
                    self.staging_path.display(),
                    self.output_path.display(),
                    e
                );
                false
            }
        }
    }

    /// Stage then finalize. Failures are logged and reported as `false`.
    pub fn commit<V: Serialize>(&self, snapshot: &Snapshot<V>) -> bool {
        if let Err(e) = self.stage(snapshot) {
            warn!("Failed to stage store: {}", e);
            self.discard_staged();
            return false;
        }
        self.finalize()
    }

    /// Remove a leftover staging file, if any
    pub fn discard_staged(&self) {
        match fs::remove_file(&self.staging_path) {
            Ok(()) => debug!("Removed staged {}", self.staging_path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove staged {}: {}",
                self.staging_path.display(),
                e
            ),
        }
    }
}
