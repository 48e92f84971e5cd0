//! mlmprep-training - BPE vocabulary induction
//!
//! This crate learns BPE merge rules from pre-tokenized words.
//!
//! # Features
//!
//! - Word deduplication with frequency weighting
//! - Parallel initial pair counting
//! - Deterministic tie-breaking by first-seen pair order
//!
//! # Example
//!
//! ```rust
//! use mlmprep_training::{BpeTrainer, TrainingConfig};
//!
//! let trainer = BpeTrainer::new(TrainingConfig {
//!     vocab_size: 20,
//!     min_frequency: 2,
//!     parallel: false,
//! });
//! let (vocab, merges) = trainer.train_words(["▁ab", "▁ab", "▁abc"]).unwrap();
//! assert_eq!(vocab.get_id("▁ab"), Some(10));
//! assert_eq!(merges.len(), 2);
//! ```

pub use mlmprep_core::{Error, Result};

pub mod training;
pub use training::{BpeTrainer, PairCounter, TrainingConfig};
