//! mlmprep-tokenizer - High-level tokenizer API
//!
//! This crate wraps vocabulary induction, encoding and artifact persistence
//! behind a single `Tokenizer`.
//!
//! # Features
//!
//! - NFKC normalization with optional lowercasing
//! - Metaspace pre-tokenization (`▁` marks word starts)
//! - BERT single and pair templates with truncation and padding
//! - Parallel batch processing
//! - Vocabulary and merges artifacts named by vocabulary size
//!
//! # Example
//!
//! ```rust
//! use mlmprep_tokenizer::{Tokenizer, TokenizerConfig};
//!
//! let config = TokenizerConfig {
//!     vocab_size: 20,
//!     min_frequency: 2,
//!     ..Default::default()
//! };
//! let tokenizer = Tokenizer::train_from_lines(["ab ab ab", "abc"], config)?;
//!
//! let encoding = tokenizer.process("ab", None, Some(6))?;
//! assert_eq!(encoding.tokens, ["[CLS]", "▁ab", "[SEP]", "<pad>", "<pad>", "<pad>"]);
//!
//! let text = tokenizer.decode(&encoding.ids, true)?;
//! assert_eq!(text, "ab");
//! # Ok::<(), mlmprep_tokenizer::Error>(())
//! ```

pub use mlmprep_core::{Error, Result};

pub mod tokenizer;
pub use tokenizer::{Encoding, Tokenizer, TokenizerBuilder, TokenizerConfig};

pub mod io;
pub use io::{ArtifactPaths, TokenizerLoader, TokenizerSaver};

pub mod pre_tokenizer;
pub use pre_tokenizer::{Normalizer, Splitter, METASPACE};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
