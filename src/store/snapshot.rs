//! In-memory view of the durable store

use crate::identifier::Identifier;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

/// Full mapping of known identifiers to their values.
///
/// Ordered so that the serialized document is stable between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot<V> {
    entries: BTreeMap<Identifier, V>,
}

impl<V> Default for Snapshot<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<V> Snapshot<V> {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &Identifier) -> Option<&V> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.entries.contains_key(id)
    }

    /// Merge entries into the snapshot. Existing keys are overwritten; nothing
    /// is ever removed. Returns how many entries were merged.
    pub fn merge(&mut self, entries: impl IntoIterator<Item = (Identifier, V)>) -> usize {
        let mut merged = 0;
        for (id, value) in entries {
            self.entries.insert(id, value);
            merged += 1;
        }
        merged
    }

    /// Keep only the entries for which `keep` returns true, returning the
    /// removed identifiers
    pub fn retain(&mut self, mut keep: impl FnMut(&Identifier, &V) -> bool) -> Vec<Identifier> {
        let mut removed = Vec::new();
        self.entries.retain(|id, value| {
            let kept = keep(id, value);
            if !kept {
                removed.push(id.clone());
            }
            kept
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Identifier, V> {
        self.entries.iter()
    }
}

impl<V> FromIterator<(Identifier, V)> for Snapshot<V> {
    fn from_iter<I: IntoIterator<Item = (Identifier, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a, V> IntoIterator for &'a Snapshot<V> {
    type Item = (&'a Identifier, &'a V);
    type IntoIter = btree_map::Iter<'a, Identifier, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overwrites_and_never_removes() {
        let mut snapshot: Snapshot<Vec<f64>> = [
            (Identifier::new("a.ts"), vec![0.1]),
            (Identifier::new("b.ts"), vec![0.2]),
        ]
        .into_iter()
        .collect();

        let merged = snapshot.merge([
            (Identifier::new("b.ts"), vec![0.9]),
            (Identifier::new("c.ts"), vec![0.3]),
        ]);

        assert_eq!(merged, 2);
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.get(&Identifier::new("a.ts")), Some(&vec![0.1]));
        assert_eq!(snapshot.get(&Identifier::new("b.ts")), Some(&vec![0.9]));
    }

    #[test]
    fn retain_reports_removed() {
        let mut snapshot: Snapshot<u32> = [
            (Identifier::new("keep.ts"), 1),
            (Identifier::new("drop.ts"), 2),
        ]
        .into_iter()
        .collect();

        let removed = snapshot.retain(|id, _| id.as_str() == "keep.ts");
        assert_eq!(removed, vec![Identifier::new("drop.ts")]);
        assert!(snapshot.contains(&Identifier::new("keep.ts")));
    }

    #[test]
    fn serializes_as_flat_object() {
        let snapshot: Snapshot<Vec<f64>> =
            [(Identifier::new("a.ts"), vec![0.1, 0.2])].into_iter().collect();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"a.ts":[0.1,0.2]}"#);
    }
}
