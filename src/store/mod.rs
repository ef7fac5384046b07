//! Durable snapshot storage
//!
//! The store is a single JSON document mapping identifiers to values. It is
//! loaded once at session start and replaced atomically at session end:
//!
//! | Step | Effect |
//! |------|--------|
//! | `load` | Read the document; missing or corrupt becomes empty |
//! | `stage` | Write the merged snapshot to the staging path |
//! | `finalize` | Rename staging over the output path |
//!
//! A session that stages nothing leaves the previous document untouched.

pub mod persistent;
pub mod snapshot;

pub use persistent::{PersistentStore, StoreConfig};
pub use snapshot::Snapshot;
