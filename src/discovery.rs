//! Resource discovery for the command line front end
//!
//! Walks a project root and yields the identifiers of files whose extension
//! is configured. The cache itself never discovers anything.

use crate::config::schema::DiscoveryConfig;
use crate::error::{EmbedCacheError, EmbedCacheResult};
use crate::identifier::Identifier;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Matches file extensions given as `.ts` or `ts`
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    extensions: Vec<String>,
}

impl ExtensionFilter {
    /// Extensions may be given with or without the leading dot
    pub fn new(extensions: &[String]) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect(),
        }
    }

    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|wanted| wanted == ext))
    }
}

/// Collect the identifiers of every matching file under `root`, sorted
pub fn discover(root: &Path, config: &DiscoveryConfig) -> EmbedCacheResult<Vec<Identifier>> {
    if !root.is_dir() {
        return Err(EmbedCacheError::PathInvalid {
            path: root.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    let filter = ExtensionFilter::new(&config.extensions);
    let excluded = |entry: &DirEntry| {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| config.exclude_dirs.iter().any(|dir| dir == name))
    };

    let mut found = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_entry(|e| !excluded(e)) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !filter.matches(entry.path()) {
            continue;
        }

        match Identifier::from_resource(root, entry.path()) {
            Ok(id) => {
                debug!("Embedding file set for: {}", id);
                found.push(id);
            }
            Err(e) => warn!("Skipping {}: {}", entry.path().display(), e),
        }
    }

    found.sort();
    Ok(found)
}
