//! Rank-ordered merge application for a single word.

use crate::core::MergeRules;
use dary_heap::OctonaryHeap;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy)]
struct Symbol {
    id: u32,
    prev: Option<usize>,
    next: Option<usize>,
    /// Zero once the symbol has been absorbed into its left neighbour
    len: usize,
}

#[derive(Debug, PartialEq, Eq)]
struct MergeOp {
    rank: u32,
    pos: usize,
    new_id: u32,
}

impl Ord for MergeOp {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on (rank, pos)
        other
            .rank
            .cmp(&self.rank)
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

impl PartialOrd for MergeOp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A word as a doubly linked list of symbols, so merges never shift indices.
#[derive(Debug, Clone)]
pub struct Word {
    symbols: Vec<Symbol>,
}

impl Word {
    /// Build a word from its initial symbol ids.
    pub fn from_ids(ids: &[u32]) -> Self {
        let last = ids.len().saturating_sub(1);
        let symbols = ids
            .iter()
            .enumerate()
            .map(|(i, &id)| Symbol {
                id,
                prev: i.checked_sub(1),
                next: (i < last).then_some(i + 1),
                len: 1,
            })
            .collect();
        Self { symbols }
    }

    fn push_candidate(&self, heap: &mut OctonaryHeap<MergeOp>, merges: &MergeRules, pos: usize) {
        if let Some(next) = self.symbols[pos].next {
            let pair = (self.symbols[pos].id, self.symbols[next].id);
            if let Some((rank, new_id)) = merges.get(pair) {
                heap.push(MergeOp { rank, pos, new_id });
            }
        }
    }

    /// Apply merges lowest rank first, leftmost first on equal rank, until no
    /// rule matches an adjacent pair.
    pub fn merge_all(&mut self, merges: &MergeRules) {
        if self.symbols.len() < 2 || merges.is_empty() {
            return;
        }

        let mut heap = OctonaryHeap::with_capacity(self.symbols.len());
        for pos in 0..self.symbols.len() - 1 {
            self.push_candidate(&mut heap, merges, pos);
        }

        while let Some(op) = heap.pop() {
            let left = self.symbols[op.pos];
            if left.len == 0 {
                continue;
            }
            let Some(right_pos) = left.next else {
                continue;
            };
            let right = self.symbols[right_pos];

            // The pair at this position may have changed since it was queued
            if merges.get((left.id, right.id)) != Some((op.rank, op.new_id)) {
                continue;
            }

            self.symbols[op.pos].id = op.new_id;
            self.symbols[op.pos].len += right.len;
            self.symbols[op.pos].next = right.next;
            self.symbols[right_pos].len = 0;
            if let Some(after) = right.next {
                self.symbols[after].prev = Some(op.pos);
            }

            if let Some(before) = left.prev {
                self.push_candidate(&mut heap, merges, before);
            }
            self.push_candidate(&mut heap, merges, op.pos);
        }
    }

    /// Remaining symbol ids, left to right.
    pub fn ids(&self) -> Vec<u32> {
        self.symbols
            .iter()
            .filter(|s| s.len > 0)
            .map(|s| s.id)
            .collect()
    }
}

/// Encode one word's initial symbol ids into its merged token ids.
pub fn merge_word(ids: &[u32], merges: &MergeRules) -> Vec<u32> {
    let mut word = Word::from_ids(ids);
    word.merge_all(merges);
    word.ids()
}
