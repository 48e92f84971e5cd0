//! Core BPE data structures.
//!
//! Vocabulary, merge rules and the pair priority queue used by training.

pub mod merges;
pub mod priority;
pub mod vocab;

pub use merges::{MergeMap, MergeRules, Pair};
pub use priority::{MergeCandidate, PairPriorityQueue, Position};
pub use vocab::{SpecialTokens, Vocab, VocabR, Vocabulary};
