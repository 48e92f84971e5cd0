//! Priority queue for BPE merge candidates.
//!
//! Candidates are ordered by count, and ties go to the pair that occurs
//! earliest in the corpus. Counts and positions change as merges are applied,
//! so the queue keeps the latest entry per pair and lazily discards heap
//! entries that no longer match it.

use crate::core::merges::Pair;
use ahash::AHashMap;
use dary_heap::OctonaryHeap;
use std::cmp::Ordering;

/// Where a pair first occurs: (distinct word index, symbol offset in that word).
pub type Position = (usize, usize);

/// A merge candidate during BPE training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCandidate {
    /// The pair of token IDs to merge
    pub pair: Pair,
    /// The frequency/count of this pair
    pub count: u64,
    /// First occurrence of the pair, earlier wins ties
    pub position: Position,
}

impl MergeCandidate {
    /// Create a new merge candidate.
    pub fn new(pair: Pair, count: u64, position: Position) -> Self {
        Self {
            pair,
            count,
            position,
        }
    }
}

impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: higher count first, then the earlier pair
        self.count
            .cmp(&other.count)
            .then_with(|| other.position.cmp(&self.position))
    }
}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue for BPE merge operations.
///
/// Uses an 8-ary heap for better cache locality than a binary heap.
pub struct PairPriorityQueue {
    /// The heap storing merge candidates
    heap: OctonaryHeap<MergeCandidate>,
    /// Latest count and position per pair, to detect stale entries
    current: AHashMap<Pair, (u64, Position)>,
}

impl PairPriorityQueue {
    /// Create a new priority queue with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: OctonaryHeap::with_capacity(capacity),
            current: AHashMap::with_capacity(capacity),
        }
    }

    /// Create a new empty priority queue.
    pub fn new() -> Self {
        Self {
            heap: OctonaryHeap::new(),
            current: AHashMap::new(),
        }
    }

    /// Push a merge candidate onto the queue.
    pub fn push(&mut self, candidate: MergeCandidate) {
        if candidate.count == 0 {
            self.current.remove(&candidate.pair);
            return;
        }
        self.current
            .insert(candidate.pair, (candidate.count, candidate.position));
        self.heap.push(candidate);
    }

    /// Pop the highest priority merge candidate.
    ///
    /// Returns None if the queue is empty or only contains stale entries.
    pub fn pop(&mut self) -> Option<MergeCandidate> {
        while let Some(candidate) = self.heap.pop() {
            if self.current.get(&candidate.pair) == Some(&(candidate.count, candidate.position)) {
                self.current.remove(&candidate.pair);
                return Some(candidate);
            }
        }
        None
    }

    /// Record a new count and position for a pair. Older entries for it
    /// become stale, and a count of zero drops the pair entirely.
    pub fn update(&mut self, pair: Pair, new_count: u64, position: Position) {
        self.push(MergeCandidate::new(pair, new_count, position));
    }

    /// Get the number of (potentially stale) entries in the queue.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Get the current count for a pair.
    pub fn get_count(&self, pair: Pair) -> Option<u64> {
        self.current.get(&pair).map(|&(count, _)| count)
    }
}

impl Default for PairPriorityQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop() {
        let mut queue = PairPriorityQueue::new();

        queue.push(MergeCandidate::new((0, 1), 10, (0, 0)));
        queue.push(MergeCandidate::new((1, 2), 20, (0, 1)));
        queue.push(MergeCandidate::new((2, 3), 15, (0, 2)));

        assert_eq!(queue.pop().unwrap().pair, (1, 2));
        assert_eq!(queue.pop().unwrap().pair, (2, 3));
        assert_eq!(queue.pop().unwrap().pair, (0, 1));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_ties_go_to_earliest_position() {
        let mut queue = PairPriorityQueue::new();

        queue.push(MergeCandidate::new((9, 9), 4, (1, 0)));
        queue.push(MergeCandidate::new((7, 8), 4, (0, 3)));
        queue.push(MergeCandidate::new((1, 2), 4, (0, 5)));

        assert_eq!(queue.pop().unwrap().pair, (7, 8));
        assert_eq!(queue.pop().unwrap().pair, (1, 2));
        assert_eq!(queue.pop().unwrap().pair, (9, 9));
    }

    #[test]
    fn test_stale_entry_detection() {
        let mut queue = PairPriorityQueue::new();

        queue.push(MergeCandidate::new((0, 1), 10, (0, 0)));
        queue.push(MergeCandidate::new((1, 2), 20, (0, 1)));

        // The first entry for (0, 1) becomes stale
        queue.update((0, 1), 15, (0, 0));

        assert_eq!(queue.pop().unwrap().pair, (1, 2));

        let second = queue.pop().unwrap();
        assert_eq!(second.pair, (0, 1));
        assert_eq!(second.count, 15);

        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_zero_count_drops_pair() {
        let mut queue = PairPriorityQueue::new();

        queue.push(MergeCandidate::new((0, 1), 10, (0, 0)));
        queue.update((0, 1), 0, (0, 0));

        assert_eq!(queue.get_count((0, 1)), None);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_moved_position_invalidates_entry() {
        let mut queue = PairPriorityQueue::new();

        queue.push(MergeCandidate::new((0, 1), 5, (0, 0)));
        queue.push(MergeCandidate::new((2, 3), 5, (1, 0)));
        // Same count, but (0, 1) now first occurs after (2, 3)
        queue.update((0, 1), 5, (2, 0));

        assert_eq!(queue.pop().unwrap().pair, (2, 3));
        assert_eq!(queue.pop().unwrap().position, (2, 0));
        assert!(queue.pop().is_none());
    }
}
