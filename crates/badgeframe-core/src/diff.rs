//! Value diffs over sets and maps.
//!
//! Stores rebuild whole maps on every recomputation. These helpers find
//! which keys actually changed so only those are reported, and a rebuilt but
//! identical entry never counts as a change.

use std::collections::{BTreeMap, BTreeSet};

/// Membership difference between two sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetDiff<T> {
    /// In the new set only.
    pub added: Vec<T>,
    /// In the old set only.
    pub removed: Vec<T>,
}

impl<T> SetDiff<T> {
    /// No membership change.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Elements added and removed going from `old` to `new`, in `Ord` order.
pub fn set_diff<T: Ord + Clone>(old: &BTreeSet<T>, new: &BTreeSet<T>) -> SetDiff<T> {
    SetDiff {
        added: new.difference(old).cloned().collect(),
        removed: old.difference(new).cloned().collect(),
    }
}

/// Whether two optional sets differ by value. A missing set equals an empty
/// one.
pub fn set_has_diff<T: Ord>(old: Option<&BTreeSet<T>>, new: Option<&BTreeSet<T>>) -> bool {
    match (old, new) {
        (Some(a), Some(b)) => a != b,
        (Some(s), None) | (None, Some(s)) => !s.is_empty(),
        (None, None) => false,
    }
}

/// Key difference between two maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapDiff<K> {
    /// Keys only in the new map.
    pub added: Vec<K>,
    /// Keys only in the old map.
    pub removed: Vec<K>,
    /// Keys in both whose values differ.
    pub changed: Vec<K>,
}

impl<K> MapDiff<K> {
    /// No key changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Every added, removed or changed key.
    pub fn into_keys(self) -> impl Iterator<Item = K> {
        self.added.into_iter().chain(self.removed).chain(self.changed)
    }
}

/// Keys added, removed, or present in both with different values.
pub fn map_diff<K: Ord + Clone, V: PartialEq>(
    old: &BTreeMap<K, V>,
    new: &BTreeMap<K, V>,
) -> MapDiff<K> {
    let added = new.keys().filter(|k| !old.contains_key(*k)).cloned().collect();
    let removed = old.keys().filter(|k| !new.contains_key(*k)).cloned().collect();
    let changed = new
        .iter()
        .filter(|(k, v)| old.get(*k).is_some_and(|prev| prev != *v))
        .map(|(k, _)| k.clone())
        .collect();
    MapDiff { added, removed, changed }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_diff_reports_both_directions() {
        let old: BTreeSet<_> = [1, 2, 3].into_iter().collect();
        let new: BTreeSet<_> = [2, 3, 4].into_iter().collect();

        let diff = set_diff(&old, &new);
        assert_eq!(diff.added, vec![4]);
        assert_eq!(diff.removed, vec![1]);
        assert!(set_diff(&new, &new).is_empty());
    }

    #[test]
    fn missing_set_equals_empty_set() {
        let empty = BTreeSet::<u8>::new();
        assert!(!set_has_diff(None, Some(&empty)));
        assert!(!set_has_diff::<u8>(None, None));

        let one: BTreeSet<_> = [1u8].into_iter().collect();
        assert!(set_has_diff(None, Some(&one)));
        assert!(set_has_diff(Some(&one), Some(&empty)));
    }

    #[test]
    fn map_diff_ignores_rebuilt_equal_values() {
        let old: BTreeMap<_, _> = [("a", vec![1]), ("b", vec![2]), ("c", vec![3])].into();
        let new: BTreeMap<_, _> = [("a", vec![1]), ("b", vec![2, 5]), ("d", vec![])].into();

        let diff = map_diff(&old, &new);
        assert_eq!(diff.added, vec!["d"]);
        assert_eq!(diff.removed, vec!["c"]);
        assert_eq!(diff.changed, vec!["b"]);

        let keys: Vec<_> = diff.into_keys().collect();
        assert_eq!(keys, vec!["d", "c", "b"]);
    }
}
