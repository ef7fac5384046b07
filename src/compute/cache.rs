//! Deduplicating read-through cache over the durable snapshot.
//!
//! The in-flight registry follows the usual shared-future pattern: the first
//! caller for an identifier inserts an `InFlight` slot holding a [`Shared`]
//! future, later callers clone and await it. Once the future resolves the
//! slot becomes `Ready` or `Failed`, and stays that way for the rest of the
//! session. Failures never reach the pending set, so the next session tries
//! again.

use crate::compute::collab::{ContentLoader, Producer};
use crate::compute::pending::PendingSet;
use crate::compute::secondary::SecondaryCache;
use crate::error::ComputeError;
use crate::identifier::Identifier;
use crate::store::Snapshot;
use futures_util::future::{BoxFuture, FutureExt as _, Shared};
use serde::Serialize;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// How a request was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Present in the snapshot loaded at session start
    Durable,
    /// Adopted from the secondary cache tier
    Secondary,
    /// Loader and producer ran for this request
    Computed,
    /// Served by an earlier or concurrent request in this session
    Session,
}

/// Per-session counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub durable_hits: usize,
    pub secondary_hits: usize,
    pub computed: usize,
    pub failed: usize,
    /// Requests that joined an in-flight or finished computation
    pub deduplicated: usize,
}

#[derive(Debug, Default)]
struct Counters {
    durable_hits: AtomicUsize,
    secondary_hits: AtomicUsize,
    computed: AtomicUsize,
    failed: AtomicUsize,
    deduplicated: AtomicUsize,
}

impl Counters {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            durable_hits: self.durable_hits.load(Ordering::Relaxed),
            secondary_hits: self.secondary_hits.load(Ordering::Relaxed),
            computed: self.computed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            deduplicated: self.deduplicated.load(Ordering::Relaxed),
        }
    }
}

/// `None` means the computation panicked.
type SharedFut<V> = Shared<BoxFuture<'static, Option<Result<(V, Resolution), ComputeError>>>>;

enum Slot<V> {
    InFlight { generation: u64, fut: SharedFut<V> },
    Ready(V),
    Failed(ComputeError),
}

/// Session-scoped cache guaranteeing at most one producer invocation in
/// flight per identifier.
pub struct ComputationCache<V> {
    snapshot: Arc<Snapshot<V>>,
    secondary: Arc<dyn SecondaryCache<V>>,
    pending: Arc<PendingSet<V>>,
    slots: Mutex<HashMap<Identifier, Slot<V>>>,
    generation: AtomicU64,
    counters: Arc<Counters>,
}

impl<V> ComputationCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(snapshot: Snapshot<V>, secondary: Arc<dyn SecondaryCache<V>>) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
            secondary,
            pending: Arc::new(PendingSet::new()),
            slots: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Return the value for `id`, computing it only on a full miss.
    ///
    /// Errors from `loader` or `producer` reach every caller awaiting this
    /// identifier, and later callers in the same session get the same error
    /// without another attempt.
    pub async fn get_or_compute(
        &self,
        id: Identifier,
        loader: Arc<dyn ContentLoader>,
        producer: Arc<dyn Producer<V>>,
    ) -> Result<V, ComputeError> {
        self.resolve(id, loader, producer)
            .await
            .map(|(value, _)| value)
    }

    /// Like [`get_or_compute`](Self::get_or_compute), also reporting which
    /// tier answered.
    pub async fn resolve(
        &self,
        id: Identifier,
        loader: Arc<dyn ContentLoader>,
        producer: Arc<dyn Producer<V>>,
    ) -> Result<(V, Resolution), ComputeError> {
        if let Some(value) = self.snapshot.get(&id) {
            Counters::bump(&self.counters.durable_hits);
            debug!("Using stored embedding for: {}", id);
            return Ok((value.clone(), Resolution::Durable));
        }

        // Check-and-insert under one lock; never held across an await.
        let (generation, fut, joined) = {
            let mut slots = self.lock_slots();
            match slots.get(&id) {
                Some(Slot::Ready(value)) => {
                    Counters::bump(&self.counters.deduplicated);
                    return Ok((value.clone(), Resolution::Session));
                }
                Some(Slot::Failed(e)) => {
                    debug!("Embedding already failed this session: {}", id);
                    return Err(e.clone());
                }
                Some(Slot::InFlight { generation, fut }) => (*generation, fut.clone(), true),
                None => {
                    let generation = self.generation.fetch_add(1, Ordering::Relaxed);
                    let fut = self.start(id.clone(), loader, producer);
                    slots.insert(
                        id.clone(),
                        Slot::InFlight {
                            generation,
                            fut: fut.clone(),
                        },
                    );
                    (generation, fut, false)
                }
            }
        };

        if joined {
            Counters::bump(&self.counters.deduplicated);
            debug!("Awaiting in-flight embedding for: {}", id);
        }

        let outcome = fut.await;

        let mut slots = self.lock_slots();
        let ours = matches!(
            slots.get(&id),
            Some(Slot::InFlight { generation: g, .. }) if *g == generation
        );

        match outcome {
            Some(Ok((value, resolution))) => {
                if ours {
                    slots.insert(id, Slot::Ready(value.clone()));
                }
                let resolution = if joined {
                    Resolution::Session
                } else {
                    resolution
                };
                Ok((value, resolution))
            }
            Some(Err(e)) => {
                if ours {
                    slots.insert(id, Slot::Failed(e.clone()));
                }
                Err(e)
            }
            None => {
                let e = ComputeError::Abandoned(id.clone());
                if ours {
                    slots.insert(id, Slot::Failed(e.clone()));
                }
                Err(e)
            }
        }
    }

    /// Build the shared future that resolves `id` past the durable tier
    fn start(
        &self,
        id: Identifier,
        loader: Arc<dyn ContentLoader>,
        producer: Arc<dyn Producer<V>>,
    ) -> SharedFut<V> {
        let secondary = Arc::clone(&self.secondary);
        let pending = Arc::clone(&self.pending);
        let counters = Arc::clone(&self.counters);

        let work = async move {
            let result =
                Self::compute(&id, secondary.as_ref(), &pending, loader, producer).await;
            match &result {
                Ok((_, Resolution::Secondary)) => Counters::bump(&counters.secondary_hits),
                Ok(_) => Counters::bump(&counters.computed),
                Err(e) => {
                    Counters::bump(&counters.failed);
                    warn!("Embedding failed for {}: {}", id, e);
                }
            }
            result
        };

        let counters = Arc::clone(&self.counters);
        AssertUnwindSafe(work)
            .catch_unwind()
            .map(move |caught| {
                if caught.is_err() {
                    Counters::bump(&counters.failed);
                }
                caught.ok()
            })
            .boxed()
            .shared()
    }

    async fn compute(
        id: &Identifier,
        secondary: &dyn SecondaryCache<V>,
        pending: &PendingSet<V>,
        loader: Arc<dyn ContentLoader>,
        producer: Arc<dyn Producer<V>>,
    ) -> Result<(V, Resolution), ComputeError> {
        if let Some(value) = secondary.get(id).await {
            debug!("Using cached embedding for: {}", id);
            pending.record(id.clone(), value.clone());
            return Ok((value, Resolution::Secondary));
        }

        debug!("Generating new embedding for: {}", id);
        let content = loader
            .load(id)
            .await
            .map_err(|e| ComputeError::load(id, e))?;
        let value = producer
            .produce(content, id)
            .await
            .map_err(|e| ComputeError::produce(id, e))?;

        if let Err(e) = secondary.store(id, &value).await {
            warn!("Failed to cache embedding for {}: {}", id, e);
        }
        pending.record(id.clone(), value.clone());
        debug!("Embedding generated and cached for: {}", id);

        Ok((value, Resolution::Computed))
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<Identifier, Slot<V>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot loaded at session start, plus anything merged since
    pub fn snapshot(&self) -> &Snapshot<V> {
        &self.snapshot
    }

    pub(crate) fn snapshot_mut(&mut self) -> &mut Snapshot<V> {
        Arc::make_mut(&mut self.snapshot)
    }

    /// Entries produced or adopted this session, not yet merged
    pub fn pending(&self) -> &PendingSet<V> {
        &self.pending
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Number of identifiers whose computation has not finished
    pub fn in_flight(&self) -> usize {
        self.lock_slots()
            .values()
            .filter(|slot| matches!(slot, Slot::InFlight { .. }))
            .count()
    }
}
