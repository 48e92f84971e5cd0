//! Train-tokenizer command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Train-tokenizer command arguments.
#[derive(Parser)]
pub struct TrainCommand {
    /// Corpus file, one sentence per line
    #[arg(short, long)]
    pub input_file: PathBuf,

    /// Directory the vocabulary and merges artifacts are written to
    #[arg(short, long)]
    pub out_dir: PathBuf,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override vocab.size
    #[arg(long)]
    pub vocab_size: Option<usize>,

    /// Override vocab.min_frequency
    #[arg(long)]
    pub min_frequency: Option<u64>,

    /// Lowercase the corpus (overrides vocab.lowercase)
    #[arg(long)]
    pub lowercase: bool,
}

use anyhow::{Context, Result};
use mlmprep_tokenizer::Tokenizer;
use std::time::Instant;
use tracing::info;

pub fn run(cmd: TrainCommand) -> Result<()> {
    let mut config = super::load_config(cmd.config.as_deref())?;
    if let Some(size) = cmd.vocab_size {
        config.vocab.size = size;
    }
    if let Some(freq) = cmd.min_frequency {
        config.vocab.min_frequency = freq;
    }
    if cmd.lowercase {
        config.vocab.lowercase = true;
    }
    config.validate()?;

    let start = Instant::now();
    let tokenizer = Tokenizer::train(&cmd.input_file, config.tokenizer_config())
        .with_context(|| format!("failed to train on {}", cmd.input_file.display()))?;
    info!(
        vocab = tokenizer.len(),
        merges = tokenizer.merges().len(),
        secs = start.elapsed().as_secs_f64(),
        "training finished"
    );

    let paths = tokenizer.save(&cmd.out_dir)?;
    println!("Vocabulary size: {}", tokenizer.len());
    println!("Vocabulary: {}", paths.vocab.display());
    println!("Merges: {}", paths.merges.display());

    Ok(())
}
