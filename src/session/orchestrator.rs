//! Drives one load / serve / merge / publish pass

use crate::compute::{ComputationCache, SecondaryCache};
use crate::identifier::Identifier;
use crate::session::report::{Checkpoint, SessionReport};
use crate::store::PersistentStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A single caching session over one persistent store
pub struct Session<V> {
    store: PersistentStore,
    cache: ComputationCache<V>,
    merged: usize,
    pruned: usize,
    staged: bool,
}

impl<V> Session<V>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Load the durable snapshot and start serving
    pub fn open(store: PersistentStore, secondary: Arc<dyn SecondaryCache<V>>) -> Self {
        let snapshot = store.load();
        debug!(
            "Session opened with {} stored entries from {}",
            snapshot.len(),
            store.output_path().display()
        );

        Self {
            cache: ComputationCache::new(snapshot, secondary),
            store,
            merged: 0,
            pruned: 0,
            staged: false,
        }
    }

    /// Cache serving this session's requests
    pub fn cache(&self) -> &ComputationCache<V> {
        &self.cache
    }

    pub fn store(&self) -> &PersistentStore {
        &self.store
    }

    /// Merge everything pending into the snapshot and stage it.
    ///
    /// Call once all work has been submitted. With nothing pending this is a
    /// no-op and no file is written.
    pub fn checkpoint(&mut self) -> Checkpoint {
        let pending = self.cache.pending().drain();
        if pending.is_empty() {
            debug!("No new embeddings, nothing to stage");
            return Checkpoint::default();
        }

        let merged = self.cache.snapshot_mut().merge(pending);
        self.merged += merged;

        let staged = self.stage();
        Checkpoint { merged, staged }
    }

    /// Drop stored entries for which `keep` returns false and stage the
    /// result. Sessions never remove entries otherwise.
    pub fn prune(&mut self, mut keep: impl FnMut(&Identifier) -> bool) -> Vec<Identifier> {
        let removed = self.cache.snapshot_mut().retain(|id, _| keep(id));
        if removed.is_empty() {
            return removed;
        }

        for id in &removed {
            debug!("Pruned stale embedding: {}", id);
        }
        self.pruned += removed.len();
        self.stage();
        removed
    }

    fn stage(&mut self) -> bool {
        match self.store.stage(self.cache.snapshot()) {
            Ok(()) => {
                debug!(
                    "Embeddings written to temporary file: {}",
                    self.store.staging_path().display()
                );
                self.staged = true;
            }
            Err(e) => {
                warn!("Failed to stage embeddings: {}", e);
                self.store.discard_staged();
                self.staged = false;
            }
        }
        self.staged
    }

    /// Publish the staged snapshot, if any. Never fails: a failed publish
    /// leaves the previous durable store in place.
    pub fn finish(self) -> SessionReport {
        let published = if self.staged {
            let moved = self.store.finalize();
            if moved {
                debug!(
                    "Embeddings moved to: {}",
                    self.store.output_path().display()
                );
            } else {
                self.store.discard_staged();
            }
            moved
        } else {
            false
        };

        let report = SessionReport {
            stats: self.cache.stats(),
            merged: self.merged,
            pruned: self.pruned,
            total_entries: self.cache.snapshot().len(),
            published,
        };
        info!("Session finished: {}", report);
        report
    }

    /// [`checkpoint`](Self::checkpoint) then [`finish`](Self::finish)
    pub fn complete(mut self) -> SessionReport {
        self.checkpoint();
        self.finish()
    }
}
