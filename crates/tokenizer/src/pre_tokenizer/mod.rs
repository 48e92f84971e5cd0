//! Pre-tokenization pipeline.
//!
//! Normalization followed by metaspace word splitting, applied identically at
//! training and encoding time.

pub mod normalize;
pub mod split;

pub use normalize::{NormalizationForm, Normalizer};
pub use split::{Splitter, METASPACE};
