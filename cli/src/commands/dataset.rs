//! Dataset command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Dataset command arguments.
#[derive(Parser)]
pub struct DatasetCommand {
    /// Training corpus, one sentence per line
    #[arg(long)]
    pub train_file: PathBuf,

    /// Validation corpus, one sentence per line
    #[arg(long)]
    pub valid_file: PathBuf,

    /// Directory holding the trained tokenizer artifacts
    #[arg(long)]
    pub tokenizer_dir: PathBuf,

    /// Directory the stores are written to
    #[arg(long)]
    pub out_dir: PathBuf,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Vocabulary size of the tokenizer artifact to load, when the directory
    /// holds more than one
    #[arg(long)]
    pub tokenizer_vocab: Option<usize>,
}

use anyhow::{Context, Result};
use mlmprep_dataset::process_with_config;
use mlmprep_tokenizer::Tokenizer;

pub fn run(cmd: DatasetCommand) -> Result<()> {
    let config = super::load_config(cmd.config.as_deref())?;

    let tokenizer = Tokenizer::load(&cmd.tokenizer_dir, cmd.tokenizer_vocab, config.vocab.lowercase)
        .with_context(|| format!("failed to load tokenizer from {}", cmd.tokenizer_dir.display()))?;

    let summary = process_with_config(&cmd.train_file, &cmd.valid_file, &tokenizer, &cmd.out_dir, &config)?;

    for split in [&summary.train, &summary.valid] {
        println!(
            "{}: {} examples -> {}",
            split.split,
            split.examples,
            split.path.display()
        );
    }

    Ok(())
}
