//! Saving and loading tokenizer artifacts.

pub mod format;
pub mod load;
pub mod save;

pub use format::{merges_file_name, vocab_file_name, OrderedVocab};
pub use load::{LoadedModel, TokenizerLoader};
pub use save::{ArtifactPaths, TokenizerSaver};
