//! Error types for embedcache
//!
//! Crate-level operations return `EmbedCacheResult<T>`. Per-identifier
//! failures inside a session are reported as [`ComputeError`], which is
//! cloneable so that every caller awaiting the same computation sees it.

use crate::identifier::Identifier;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Boxed error returned by producers
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for embedcache operations
pub type EmbedCacheResult<T> = Result<T, EmbedCacheError>;

/// All errors that can occur in embedcache
#[derive(Error, Debug)]
pub enum EmbedCacheError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Producer errors
    #[error("No producer command configured")]
    ProducerNotConfigured,

    #[error("Producer command failed for {identifier}: {reason}")]
    ProducerCommand { identifier: String, reason: String },

    #[error("Producer returned malformed output for {identifier}: {reason}")]
    ProducerOutput { identifier: String, reason: String },

    // Session errors
    #[error("{failed} of {total} resources failed to embed")]
    SessionIncomplete { failed: usize, total: usize },

    #[error(transparent)]
    Compute(#[from] ComputeError),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid path: {path}: {reason}")]
    PathInvalid { path: PathBuf, reason: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EmbedCacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ProducerNotConfigured => {
                Some("Set [producer] command in .embedcache.toml or pass --embed-command")
            }
            Self::ProducerOutput { .. } => {
                Some("The producer must print a JSON array of numbers on stdout")
            }
            Self::SessionIncomplete { .. } => {
                Some("Successful embeddings were saved; rerun to retry the failures")
            }
            _ => None,
        }
    }
}

/// Failure of a single identifier's computation.
///
/// Shared between every caller awaiting the same in-flight computation,
/// hence the `Arc`'d sources.
#[derive(Error, Debug, Clone)]
pub enum ComputeError {
    #[error("failed to load content for {identifier}")]
    Load {
        identifier: Identifier,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("failed to produce value for {identifier}")]
    Produce {
        identifier: Identifier,
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("computation for {0} was abandoned before completing")]
    Abandoned(Identifier),
}

impl ComputeError {
    /// Identifier whose computation failed
    pub fn identifier(&self) -> &Identifier {
        match self {
            Self::Load { identifier, .. }
            | Self::Produce { identifier, .. }
            | Self::Abandoned(identifier) => identifier,
        }
    }

    pub(crate) fn load(identifier: &Identifier, source: std::io::Error) -> Self {
        Self::Load {
            identifier: identifier.clone(),
            source: Arc::new(source),
        }
    }

    pub(crate) fn produce(identifier: &Identifier, source: BoxError) -> Self {
        Self::Produce {
            identifier: identifier.clone(),
            source: Arc::from(source),
        }
    }
}
