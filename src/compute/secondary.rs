//! Secondary cache tier consulted between the durable snapshot and the
//! producer

use crate::error::{EmbedCacheError, EmbedCacheResult};
use crate::identifier::Identifier;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tokio::fs;
use tracing::debug;

/// Key-value cache queried by identifier. Lookups never fail: anything
/// unreadable is a miss.
#[async_trait]
pub trait SecondaryCache<V>: Send + Sync {
    async fn get(&self, id: &Identifier) -> Option<V>;

    async fn store(&self, id: &Identifier, value: &V) -> EmbedCacheResult<()>;
}

/// Disabled tier: always misses, discards stores
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSecondary;

#[async_trait]
impl<V: Sync + 'static> SecondaryCache<V> for NoSecondary {
    async fn get(&self, _id: &Identifier) -> Option<V> {
        None
    }

    async fn store(&self, _id: &Identifier, _value: &V) -> EmbedCacheResult<()> {
        Ok(())
    }
}

/// Process-local map
#[derive(Debug)]
pub struct MemoryCache<V> {
    map: Mutex<HashMap<Identifier, V>>,
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self {
            map: Mutex::new(HashMap::new()),
        }
    }
}

impl<V> MemoryCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<V: Clone + Send + Sync + 'static> SecondaryCache<V> for MemoryCache<V> {
    async fn get(&self, id: &Identifier) -> Option<V> {
        self.map
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    async fn store(&self, id: &Identifier, value: &V) -> EmbedCacheResult<()> {
        self.map
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), value.clone());
        Ok(())
    }
}

/// One JSON file per entry under a directory.
///
/// File names are the SHA-256 of `embedding-<identifier>`, so arbitrary
/// identifiers map to flat, safe names.
#[derive(Debug, Clone)]
pub struct DirCache<V> {
    root: PathBuf,
    _value: PhantomData<fn() -> V>,
}

impl<V> DirCache<V> {
    /// Open (creating if needed) a cache directory
    pub async fn open(root: impl Into<PathBuf>) -> EmbedCacheResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            EmbedCacheError::io(format!("creating cache directory {}", root.display()), e)
        })?;
        Ok(Self {
            root,
            _value: PhantomData,
        })
    }

    fn entry_path(&self, id: &Identifier) -> PathBuf {
        self.root.join(format!("{}.json", cache_key(id)))
    }
}

/// Hex-encoded SHA-256 of the entry key
fn cache_key(id: &Identifier) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"embedding-");
    hasher.update(id.as_str().as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl<V> SecondaryCache<V> for DirCache<V>
where
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, id: &Identifier) -> Option<V> {
        let path = self.entry_path(id);
        let content = fs::read_to_string(&path).await.ok()?;
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Ignoring unreadable cache entry {}: {}", path.display(), e);
                None
            }
        }
    }

    async fn store(&self, id: &Identifier, value: &V) -> EmbedCacheResult<()> {
        let path = self.entry_path(id);
        let temp = path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        let content = serde_json::to_vec(value)?;

        fs::write(&temp, content).await.map_err(|e| {
            EmbedCacheError::io(format!("writing cache entry {}", temp.display()), e)
        })?;
        if let Err(e) = fs::rename(&temp, &path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(EmbedCacheError::io(
                format!("moving cache entry to {}", path.display()),
                e,
            ));
        }
        Ok(())
    }
}
