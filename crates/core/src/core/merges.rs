//! Merge rule management for BPE.
//!
//! Merge rules are stored using token IDs rather than strings for fast
//! comparison. The rank of a rule is its position in the learned sequence.

use crate::error::{Error, Result};
use ahash::AHashMap;

/// A pair of token IDs that can be merged.
pub type Pair = (u32, u32);

/// Merge rule mapping: pair -> (rank, new_token_id).
///
/// The rank indicates the priority of this merge rule (lower rank = higher priority).
/// The new_token_id is the ID of the token created by merging this pair.
pub type MergeMap = AHashMap<Pair, (u32, u32)>;

/// Ordered collection of BPE merge rules with constant-time lookup.
#[derive(Debug, Clone, Default)]
pub struct MergeRules {
    /// Merge rules: pair -> (rank, new_token_id)
    pub merges: MergeMap,
    /// Rules in rank order, with the id each one produces
    ordered: Vec<(Pair, u32)>,
}

impl MergeRules {
    /// Create a new empty collection of merge rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new collection with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            merges: MergeMap::with_capacity(capacity),
            ordered: Vec::with_capacity(capacity),
        }
    }

    /// Append a merge rule with the next rank.
    ///
    /// Returns the rank assigned to the rule. A pair can only be learned once.
    pub fn push(&mut self, pair: Pair, new_token_id: u32) -> Result<u32> {
        if self.merges.contains_key(&pair) {
            return Err(Error::InvalidMerge(format!(
                "pair ({}, {}) is already a merge rule",
                pair.0, pair.1
            )));
        }
        let rank = self.ordered.len() as u32;
        self.merges.insert(pair, (rank, new_token_id));
        self.ordered.push((pair, new_token_id));
        Ok(rank)
    }

    /// Get the merge rule for a pair.
    ///
    /// Returns Some((rank, new_token_id)) if this pair should be merged,
    /// None otherwise.
    #[inline]
    pub fn get(&self, pair: Pair) -> Option<(u32, u32)> {
        self.merges.get(&pair).copied()
    }

    /// Check whether `pair` is a known rule.
    #[inline]
    pub fn contains(&self, pair: Pair) -> bool {
        self.merges.contains_key(&pair)
    }

    /// Get the number of merge rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Check if there are no merge rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Rules in rank order as `(pair, new_token_id)`.
    pub fn iter(&self) -> impl Iterator<Item = (Pair, u32)> + '_ {
        self.ordered.iter().copied()
    }
}
