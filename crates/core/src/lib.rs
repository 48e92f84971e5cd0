//! mlmprep-core - Core BPE data structures
//!
//! This crate provides the vocabulary, merge rules and merge encoder shared by
//! training and the high-level tokenizer.
//!
//! # Features
//!
//! - Vocabulary with the five special tokens reserved at fixed ids
//! - Ordered merge rules with constant-time pair lookup
//! - Priority queue with deterministic tie-breaking for training
//! - Error handling with detailed diagnostics
//!
//! # Example
//!
//! ```rust
//! use mlmprep_core::Vocabulary;
//!
//! let mut vocab = Vocabulary::new();
//! let id = vocab.add_token("▁hola");
//! assert_eq!(id, 5);
//! assert_eq!(vocab.get_token(4), Some("[CLS]"));
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod core;
pub use self::core::vocab::{
    CLS_TOKEN, MASK_TOKEN, PAD_TOKEN, SEP_TOKEN, SPECIAL_TOKENS, UNK_TOKEN,
};
pub use self::core::{
    MergeCandidate, MergeMap, MergeRules, Pair, PairPriorityQueue, Position, SpecialTokens, Vocab,
    VocabR, Vocabulary,
};

pub mod encoding;
pub use encoding::{merge_word, Word};
