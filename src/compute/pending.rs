//! Entries produced during the current session

use crate::identifier::Identifier;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Entries computed or adopted this session and not yet merged into the
/// durable snapshot. Safe to append from many tasks at once.
#[derive(Debug)]
pub struct PendingSet<V> {
    entries: Mutex<BTreeMap<Identifier, V>>,
}

impl<V> Default for PendingSet<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<V> PendingSet<V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<Identifier, V>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, id: Identifier, value: V) {
        self.lock().insert(id, value);
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Take every pending entry, leaving the set empty
    pub fn drain(&self) -> BTreeMap<Identifier, V> {
        std::mem::take(&mut *self.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn drain_empties_the_set() {
        let pending = PendingSet::new();
        pending.record(Identifier::new("a.ts"), 1);
        pending.record(Identifier::new("b.ts"), 2);

        let drained = pending.drain();
        assert_eq!(drained.len(), 2);
        assert!(pending.is_empty());
        assert!(pending.drain().is_empty());
    }

    #[test]
    fn concurrent_records() {
        let pending = Arc::new(PendingSet::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let pending = Arc::clone(&pending);
                std::thread::spawn(move || pending.record(Identifier::new(format!("{i}.ts")), i))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(pending.len(), 8);
    }
}
