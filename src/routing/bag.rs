//! Pareto sets of (arrival time, walking time) labels.
//!
//! The scalar engine tracks a single earliest arrival per stop;
//! multi-criteria variants layered on the same round structure carry a [`Bag`]
//! per stop instead.

use crate::model::types::Time;

/// One multi-criteria label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    pub arrival_time: Time,
    pub walking_time: Time,
}

impl Label {
    #[must_use]
    pub fn new(arrival_time: Time, walking_time: Time) -> Self {
        Label {
            arrival_time,
            walking_time,
        }
    }

    /// Weak Pareto dominance: no worse in both criteria, strictly better in
    /// at least one.
    #[must_use]
    pub fn dominates(&self, other: &Label) -> bool {
        (self.arrival_time <= other.arrival_time && self.walking_time < other.walking_time)
            || (self.arrival_time < other.arrival_time && self.walking_time <= other.walking_time)
    }
}

/// Set of mutually non-dominated labels, kept sorted by arrival time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bag {
    labels: Vec<Label>,
}

impl Bag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a label unless it is dominated; evicts everything it dominates.
    ///
    /// Returns whether the bag changed. Exact duplicates are dropped.
    pub fn insert(&mut self, label: Label) -> bool {
        if self
            .labels
            .iter()
            .any(|existing| existing.dominates(&label) || *existing == label)
        {
            return false;
        }
        self.labels.retain(|existing| !label.dominates(existing));
        let pos = self
            .labels
            .partition_point(|existing| existing.arrival_time < label.arrival_time);
        self.labels.insert(pos, label);
        true
    }

    /// Shorthand for inserting `Label::new(arrival_time, walking_time)`.
    pub fn insert_times(&mut self, arrival_time: Time, walking_time: Time) -> bool {
        self.insert(Label::new(arrival_time, walking_time))
    }

    /// Pareto union with another bag; returns whether this bag changed.
    pub fn merge(&mut self, other: &Bag) -> bool {
        let mut changed = false;
        for &label in &other.labels {
            changed |= self.insert(label);
        }
        changed
    }

    /// Labels in ascending arrival-time order.
    #[must_use]
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn better_walk_at_equal_arrival_replaces() {
        let mut bag = Bag::new();
        assert!(bag.insert_times(36000, 5));
        assert!(bag.insert_times(36000, 3));
        assert_eq!(bag.labels(), &[Label::new(36000, 3)]);
    }

    #[test]
    fn incomparable_labels_coexist() {
        let mut bag = Bag::new();
        bag.insert_times(36000, 3);
        bag.insert_times(35700, 6);
        assert_eq!(
            bag.labels(),
            &[Label::new(35700, 6), Label::new(36000, 3)]
        );
    }

    #[test]
    fn dominated_insert_is_rejected() {
        let mut bag = Bag::new();
        bag.insert_times(100, 1);
        assert!(!bag.insert_times(100, 2));
        assert!(!bag.insert_times(150, 1));
        assert!(!bag.insert_times(100, 1));
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn insert_evicts_everything_it_dominates() {
        let mut bag = Bag::new();
        bag.insert_times(100, 10);
        bag.insert_times(200, 5);
        bag.insert_times(300, 2);
        assert!(bag.insert_times(100, 2));
        assert_eq!(bag.labels(), &[Label::new(100, 2)]);
    }

    #[test]
    fn no_member_ever_dominates_another() {
        let mut bag = Bag::new();
        for (arr, walk) in [(5, 5), (3, 7), (7, 3), (4, 6), (6, 4), (5, 5), (2, 9)] {
            bag.insert_times(arr, walk);
        }
        for a in bag.labels() {
            for b in bag.labels() {
                assert!(!a.dominates(b), "{a:?} dominates {b:?}");
            }
        }
    }

    #[test]
    fn merge_is_commutative() {
        let mut left = Bag::new();
        left.insert_times(10, 4);
        left.insert_times(12, 2);
        let mut right = Bag::new();
        right.insert_times(11, 3);
        right.insert_times(9, 9);

        let mut ab = left.clone();
        ab.merge(&right);
        let mut ba = right.clone();
        ba.merge(&left);
        assert_eq!(ab, ba);
    }
}
