//! mlmprep CLI - tokenizer training and MLM dataset preparation.
//!
//! This is the main entry point for the `mlmprep` command-line tool.
//! Log output is controlled with `RUST_LOG` and defaults to `info`.

mod commands;

use clap::{Parser, Subcommand};
use commands::{DatasetCommand, DecodeCommand, EncodeCommand, InspectCommand, TrainCommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mlmprep")]
#[command(about = "Subword tokenizer training and MLM dataset preparation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a tokenizer from a text corpus
    TrainTokenizer(TrainCommand),
    /// Encode train and valid corpora into dataset stores
    Dataset(DatasetCommand),
    /// Encode text to token IDs
    Encode(EncodeCommand),
    /// Decode token IDs back to text
    Decode(DecodeCommand),
    /// Show the size of a dataset store or one of its examples
    Inspect(InspectCommand),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::TrainTokenizer(cmd) => commands::train::run(cmd)?,
        Commands::Dataset(cmd) => commands::dataset::run(cmd)?,
        Commands::Encode(cmd) => commands::encode::run(cmd)?,
        Commands::Decode(cmd) => commands::decode::run(cmd)?,
        Commands::Inspect(cmd) => commands::inspect::run(cmd)?,
    }

    Ok(())
}
