//! Encode command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    /// Directory holding the trained tokenizer artifacts
    #[arg(short, long)]
    pub tokenizer_dir: PathBuf,

    /// Text to encode ("-" reads stdin)
    #[arg(short, long)]
    pub input: String,

    /// Second sentence of a pair
    #[arg(short, long)]
    pub pair: Option<String>,

    /// Truncate or pad to this length
    #[arg(short, long)]
    pub max_seq_len: Option<usize>,

    /// Vocabulary size of the artifact to load
    #[arg(long)]
    pub vocab_size: Option<usize>,

    /// Lowercase input, matching a tokenizer trained with lowercasing
    #[arg(long, default_value_t = false)]
    pub lowercase: bool,
}

use anyhow::Result;
use mlmprep_tokenizer::Tokenizer;

pub fn run(cmd: EncodeCommand) -> Result<()> {
    let tokenizer = Tokenizer::load(&cmd.tokenizer_dir, cmd.vocab_size, cmd.lowercase)?;

    // Read input text (from stdin if "-")
    let input_text = if cmd.input == "-" {
        use std::io::Read;
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        cmd.input
    };

    let encoding = tokenizer.process(&input_text, cmd.pair.as_deref(), cmd.max_seq_len)?;

    let output = serde_json::json!({
        "ids": encoding.ids,
        "tokens": encoding.tokens,
        "special_tokens_mask": encoding.special_tokens_mask,
        "attention_mask": encoding.attention_mask,
        "type_ids": encoding.type_ids,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
