//! Encoding pipeline: corpus files in, dataset stores out.
//!
//! Both splits stream through the same read-only [`Tokenizer`] one minibatch
//! at a time. A run commits either both stores or neither.

use crate::batcher::LineBatcher;
use crate::config::Config;
use crate::error::{DatasetError, Result};
use crate::packed::PackedTensor;
use crate::store::{self, PendingStore, Split, StoreWriter};
use mlmprep_tokenizer::Tokenizer;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Outcome for one split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSummary {
    pub split: Split,
    pub examples: u64,
    pub path: PathBuf,
}

/// Outcome of a processing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSummary {
    pub train: SplitSummary,
    pub valid: SplitSummary,
    pub max_seq_length: usize,
    pub max_vocab_size: usize,
}

/// Settings for one run, shared by both splits.
#[derive(Debug, Clone, Copy)]
struct RunSettings {
    max_seq_length: usize,
    max_vocab_size: usize,
    minibatch_size: usize,
}

/// Encode `train_file` and `valid_file` into stores under `out_dir`, keyed
/// by `(max_seq_length, max_vocab_size)`.
///
/// Store index `i` holds the `i`-th non-blank line of its input. Any
/// existing stores for the same key are replaced. On error no store for the
/// key is left behind.
pub fn process(
    train_file: impl AsRef<Path>,
    valid_file: impl AsRef<Path>,
    tokenizer: &Tokenizer,
    out_dir: impl AsRef<Path>,
    max_seq_length: usize,
    max_vocab_size: usize,
    minibatch_size: usize,
) -> Result<ProcessSummary> {
    let settings = RunSettings {
        max_seq_length,
        max_vocab_size,
        minibatch_size,
    };
    validate(&settings)?;

    let (train_file, valid_file) = (train_file.as_ref(), valid_file.as_ref());
    let out_dir = out_dir.as_ref();
    std::fs::create_dir_all(out_dir).map_err(|e| DatasetError::io(out_dir, e))?;

    let train_target = store::store_path(out_dir, Split::Train, max_seq_length, max_vocab_size);
    let valid_target = store::store_path(out_dir, Split::Valid, max_seq_length, max_vocab_size);
    for target in [&train_target, &valid_target] {
        store::remove_if_exists(target)?;
        store::remove_partial(target)?;
    }

    info!(
        train = %train_file.display(),
        valid = %valid_file.display(),
        out_dir = %out_dir.display(),
        max_seq_length,
        max_vocab_size,
        minibatch_size,
        "processing dataset"
    );

    let (train, valid) = rayon::join(
        || encode_split(Split::Train, train_file, tokenizer, &train_target, settings),
        || encode_split(Split::Valid, valid_file, tokenizer, &valid_target, settings),
    );
    // an error in either split drops the other's pending store, removing it
    let train = train?;
    let valid = valid?;

    let summary = commit_both(train, valid, settings)?;
    info!(
        train_examples = summary.train.examples,
        valid_examples = summary.valid.examples,
        train_store = %summary.train.path.display(),
        valid_store = %summary.valid.path.display(),
        "dataset written"
    );
    Ok(summary)
}

/// [`process`] with settings taken from a validated [`Config`].
pub fn process_with_config(
    train_file: impl AsRef<Path>,
    valid_file: impl AsRef<Path>,
    tokenizer: &Tokenizer,
    out_dir: impl AsRef<Path>,
    config: &Config,
) -> Result<ProcessSummary> {
    config.validate()?;
    process(
        train_file,
        valid_file,
        tokenizer,
        out_dir,
        config.training.max_seq_length,
        config.vocab.max_size,
        config.data.processing_minibatch_size,
    )
}

fn validate(settings: &RunSettings) -> Result<()> {
    if settings.max_seq_length < 3 {
        return Err(DatasetError::InvalidConfig(format!(
            "max_seq_length must be at least 3, got {}",
            settings.max_seq_length
        )));
    }
    if settings.max_vocab_size == 0 {
        return Err(DatasetError::InvalidConfig(
            "max_vocab_size must be greater than 0".to_string(),
        ));
    }
    if settings.minibatch_size == 0 {
        return Err(DatasetError::InvalidConfig(
            "minibatch_size must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

fn encode_split(
    split: Split,
    input: &Path,
    tokenizer: &Tokenizer,
    target: &Path,
    settings: RunSettings,
) -> Result<PendingStore> {
    let batches = LineBatcher::open(input, settings.minibatch_size)?;
    let mut writer = StoreWriter::create(target, settings.max_seq_length, settings.max_vocab_size)?;

    for (batch_index, batch) in batches.enumerate() {
        let lines = batch?;
        let encodings = tokenizer.process_batch(&lines, Some(settings.max_seq_length))?;
        for encoding in &encodings {
            writer.append(&PackedTensor::from_encoding(encoding, settings.max_seq_length)?)?;
        }
        writer.flush()?;
        debug!(
            split = %split,
            batch = batch_index,
            lines = lines.len(),
            total = writer.count(),
            "minibatch written"
        );
    }

    writer.finish()
}

fn commit_both(train: PendingStore, valid: PendingStore, settings: RunSettings) -> Result<ProcessSummary> {
    let train_examples = train.count();
    let valid_examples = valid.count();

    let train_path = train.commit()?;
    let valid_path = match valid.commit() {
        Ok(path) => path,
        Err(err) => {
            let _ = store::remove_if_exists(&train_path);
            return Err(err);
        }
    };

    Ok(ProcessSummary {
        train: SplitSummary {
            split: Split::Train,
            examples: train_examples,
            path: train_path,
        },
        valid: SplitSummary {
            split: Split::Valid,
            examples: valid_examples,
            path: valid_path,
        },
        max_seq_length: settings.max_seq_length,
        max_vocab_size: settings.max_vocab_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_settings_before_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let tokenizer = Tokenizer::train_from_lines(["a b"], Default::default()).unwrap();

        for (seq, vocab, batch) in [(2, 10, 4), (12, 0, 4), (12, 10, 0)] {
            let err = process("t.txt", "v.txt", &tokenizer, &out, seq, vocab, batch).err();
            assert!(matches!(err, Some(DatasetError::InvalidConfig(_))));
        }
        assert!(!out.exists());
    }
}
