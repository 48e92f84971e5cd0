//! CLI commands for mlmprep.

pub mod dataset;
pub mod decode;
pub mod encode;
pub mod inspect;
pub mod train;

pub use dataset::DatasetCommand;
pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use inspect::InspectCommand;
pub use train::TrainCommand;

use anyhow::{Context, Result};
use mlmprep_dataset::Config;
use std::path::Path;

/// Load `--config` if given, otherwise the defaults. Either way the result is
/// validated.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    config.validate()?;
    Ok(config)
}
