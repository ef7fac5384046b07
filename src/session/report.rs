//! Session outcome records

use crate::compute::CacheStats;
use serde::Serialize;
use std::fmt;

/// Result of merging the pending set into the snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checkpoint {
    /// Entries merged into the snapshot
    pub merged: usize,
    /// Whether the merged snapshot was written to the staging location
    pub staged: bool,
}

impl Checkpoint {
    /// Nothing was pending, nothing was written
    pub fn is_noop(&self) -> bool {
        self.merged == 0 && !self.staged
    }
}

/// Summary of a finished session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub stats: CacheStats,
    /// Entries merged across all checkpoints
    pub merged: usize,
    /// Entries removed by pruning
    pub pruned: usize,
    /// Size of the snapshot at the end of the session
    pub total_entries: usize,
    /// Whether the durable store was replaced
    pub published: bool,
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} stored, {} cached, {} generated, {} failed",
            self.stats.durable_hits, self.stats.secondary_hits, self.stats.computed, self.stats.failed
        )?;
        if self.pruned > 0 {
            write!(f, ", {} pruned", self.pruned)?;
        }
        write!(f, " ({} entries total)", self.total_entries)
    }
}
