//! Decode command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Decode command arguments.
#[derive(Parser)]
pub struct DecodeCommand {
    /// Directory holding the trained tokenizer artifacts
    #[arg(short, long)]
    pub tokenizer_dir: PathBuf,

    /// Token IDs to decode (comma-separated)
    #[arg(short, long)]
    pub ids: String,

    /// Keep special tokens in the output
    #[arg(short, long, default_value_t = false)]
    pub keep_special: bool,

    /// Vocabulary size of the artifact to load
    #[arg(long)]
    pub vocab_size: Option<usize>,
}

use anyhow::{Context, Result};
use mlmprep_tokenizer::Tokenizer;

pub fn run(cmd: DecodeCommand) -> Result<()> {
    let tokenizer = Tokenizer::load(&cmd.tokenizer_dir, cmd.vocab_size, false)?;

    let ids: Vec<u32> = cmd
        .ids
        .split(',')
        .map(|s| {
            let s = s.trim();
            s.parse::<u32>()
                .with_context(|| format!("invalid token id '{s}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    let text = tokenizer.decode(&ids, !cmd.keep_special)?;
    println!("{}", text);

    Ok(())
}
