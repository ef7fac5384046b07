//! Session-scoped computation cache
//!
//! Resolves an identifier through three tiers, stopping at the first hit:
//!
//! | Tier | Source | Side effect |
//! |------|--------|-------------|
//! | Durable | Snapshot loaded at session start | none |
//! | Secondary | [`SecondaryCache`] lookup | recorded into the pending set |
//! | Computed | loader then producer | stored in secondary, recorded |
//!
//! Concurrent requests for one identifier share a single in-flight
//! computation, so the producer runs at most once per identifier.

pub mod cache;
pub mod collab;
pub mod pending;
pub mod secondary;

pub use cache::{CacheStats, ComputationCache, Resolution};
pub use collab::{ContentLoader, FnProducer, FsLoader, Producer};
pub use pending::PendingSet;
pub use secondary::{DirCache, MemoryCache, NoSecondary, SecondaryCache};
