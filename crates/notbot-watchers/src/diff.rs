//! Set difference between two membership snapshots.

use std::collections::HashSet;
use std::hash::Hash;

/// Arrivals, departures and the unchanged remainder between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotDiff<T> {
    /// In `current` but not in `previous`, in `current` order.
    pub arrived: Vec<T>,
    /// In `previous` but not in `current`, in `previous` order.
    pub left: Vec<T>,
    /// `previous` minus `left`, sorted.
    pub still_present: Vec<T>,
}

impl<T> SnapshotDiff<T> {
    /// True when nobody arrived and nobody left.
    pub fn is_empty(&self) -> bool {
        self.arrived.is_empty() && self.left.is_empty()
    }
}

/// Elements of `a` that do not occur in `b`, keeping `a`'s order.
pub fn subtract<T: Clone + Eq + Hash>(a: &[T], b: &[T]) -> Vec<T> {
    let exclude: HashSet<&T> = b.iter().collect();
    a.iter().filter(|x| !exclude.contains(x)).cloned().collect()
}

pub fn diff<T: Clone + Eq + Hash + Ord>(current: &[T], previous: &[T]) -> SnapshotDiff<T> {
    let arrived = subtract(current, previous);
    let left = subtract(previous, current);
    let mut still_present = subtract(previous, &left);
    still_present.sort();

    SnapshotDiff {
        arrived,
        left,
        still_present,
    }
}
