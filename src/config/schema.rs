//! Configuration schema for embedcache
//!
//! Configuration is read from `~/.config/embedcache/config.toml` and from a
//! project-local `.embedcache.toml`, the local file taking precedence.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Durable store settings
    pub store: StoreSettings,

    /// Which files are offered to the cache
    pub discovery: DiscoveryConfig,

    /// Secondary cache tier
    pub secondary: SecondaryConfig,

    /// Embedding producer
    pub producer: ProducerConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Durable store locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Final store document, relative to the project root unless absolute
    pub output_path: PathBuf,

    /// Staging file for the atomic replace (unique per session if unset)
    pub staging_path: Option<PathBuf>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("embeddings.json"),
            staging_path: None,
        }
    }
}

/// Resource discovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// File extensions to embed, with leading dot
    pub extensions: Vec<String>,

    /// Directory names never descended into
    pub exclude_dirs: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extensions: vec![".ts".to_string(), ".tsx".to_string()],
            exclude_dirs: vec![
                "node_modules".to_string(),
                ".git".to_string(),
                "dist".to_string(),
                "target".to_string(),
            ],
        }
    }
}

/// Secondary cache tier settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondaryConfig {
    /// Enable the on-disk secondary cache (default: true)
    pub enabled: bool,

    /// Cache directory (defaults to the user cache directory)
    pub dir: Option<PathBuf>,
}

impl Default for SecondaryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
        }
    }
}

/// Embedding producer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProducerConfig {
    /// Command run once per resource: content on stdin, JSON array on stdout
    pub command: Vec<String>,

    /// Maximum producer invocations running at once
    pub concurrency: usize,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            command: vec![],
            concurrency: 8,
        }
    }
}
