//! Encoding of pre-tokenized words into merged token ids.

pub mod word;

pub use word::{merge_word, Word};
