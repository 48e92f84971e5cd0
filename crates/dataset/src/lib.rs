//! # mlmprep-dataset
//!
//! Turns raw text corpora into fixed-length, randomly indexable training
//! examples for masked-language-model pretraining.
//!
//! Lines are streamed in minibatches through a trained
//! [`mlmprep_tokenizer::Tokenizer`], packed into `4 × max_seq_length`
//! tensors and appended to one memory-mapped store per split.
//!
//! ```no_run
//! use mlmprep_dataset::{process, Split, Store};
//! use mlmprep_tokenizer::Tokenizer;
//!
//! let tokenizer = Tokenizer::load("tokenizer/", None, false)?;
//! process("train.txt", "valid.txt", &tokenizer, "data/", 128, 30000, 10000)?;
//!
//! let store = Store::open("data/", Split::Train, 128, 30000)?.with_subset(0.1)?;
//! for example in store.iter() {
//!     let _ids = example.ids();
//! }
//! # Ok::<(), mlmprep_dataset::DatasetError>(())
//! ```

pub mod batcher;
pub mod config;
pub mod error;
pub mod packed;
pub mod pipeline;
pub mod store;

pub use batcher::LineBatcher;
pub use config::{Config, DataConfig, TrainingSection, VocabConfig};
pub use error::{DatasetError, Result};
pub use packed::{Channel, PackedTensor, CHANNELS};
pub use pipeline::{process, process_with_config, ProcessSummary, SplitSummary};
pub use store::{store_file_name, store_path, PendingStore, Split, Store, StoreWriter, HEADER_LEN};
