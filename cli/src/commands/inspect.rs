//! Inspect command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Inspect command arguments.
#[derive(Parser)]
pub struct InspectCommand {
    /// Directory holding the dataset stores
    #[arg(short, long)]
    pub dataset_dir: PathBuf,

    /// Split to open: train or valid
    #[arg(short, long, default_value = "train")]
    pub split: Split,

    /// Example to print
    #[arg(short, long)]
    pub index: Option<usize>,

    /// JSON configuration file the stores were built with
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Tokenizer directory, to show token strings next to ids
    #[arg(short, long)]
    pub tokenizer_dir: Option<PathBuf>,

    /// Vocabulary size of the tokenizer artifact to load, when the directory
    /// holds more than one
    #[arg(long)]
    pub tokenizer_vocab: Option<usize>,
}

use anyhow::Result;
use mlmprep_dataset::{Split, Store};
use mlmprep_tokenizer::Tokenizer;

pub fn run(cmd: InspectCommand) -> Result<()> {
    let config = super::load_config(cmd.config.as_deref())?;
    let store = Store::open(
        &cmd.dataset_dir,
        cmd.split,
        config.training.max_seq_length,
        config.vocab.max_size,
    )?;

    println!("Store: {}", store.path().display());
    println!("Examples: {}", store.len());
    println!("Sequence length: {}", store.max_seq_length());

    let Some(index) = cmd.index else {
        return Ok(());
    };
    let example = store.get(index)?;

    let mut output = serde_json::json!({
        "index": index,
        "ids": example.ids(),
        "special_tokens_mask": example.special_tokens_mask(),
        "attention_mask": example.attention_mask(),
        "type_ids": example.type_ids(),
    });

    if let Some(dir) = &cmd.tokenizer_dir {
        let tokenizer = Tokenizer::load(dir, cmd.tokenizer_vocab, config.vocab.lowercase)?;
        let tokens = example
            .ids()
            .iter()
            .map(|&id| tokenizer.id_to_token(id).map(str::to_string))
            .collect::<mlmprep_tokenizer::Result<Vec<_>>>()?;
        output["tokens"] = serde_json::json!(tokens);
        output["text"] = serde_json::json!(tokenizer.decode(example.ids(), true)?);
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
