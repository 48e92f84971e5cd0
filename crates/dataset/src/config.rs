//! Resolved run configuration.
//!
//! Serialized as JSON. Every field has a default, so `{}` is a complete
//! configuration. The struct is immutable once loaded and is validated at
//! every entry point that consumes it.

use crate::error::{DatasetError, Result};
use mlmprep_tokenizer::TokenizerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub vocab: VocabConfig,
    pub training: TrainingSection,
    pub data: DataConfig,
}

/// Tokenizer vocabulary settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabConfig {
    /// Target vocabulary size when training the tokenizer.
    pub size: usize,
    /// Minimum pair frequency for a merge to be learned.
    pub min_frequency: u64,
    /// Lowercase text before training and encoding.
    pub lowercase: bool,
    /// Vocabulary size that keys the dataset store files.
    pub max_size: usize,
    /// Language tag used in tokenizer artifact names.
    pub language: String,
}

impl Default for VocabConfig {
    fn default() -> Self {
        Self {
            size: 30_000,
            min_frequency: 2,
            lowercase: false,
            max_size: 30_000,
            language: "ca".to_string(),
        }
    }
}

/// Sequence settings shared with model training.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSection {
    /// Length every encoded example is truncated or padded to.
    pub max_seq_length: usize,
}

impl Default for TrainingSection {
    fn default() -> Self {
        Self {
            max_seq_length: 512,
        }
    }
}

/// Dataset processing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Lines read and encoded per minibatch.
    pub processing_minibatch_size: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            processing_minibatch_size: 10_000,
        }
    }
}

impl Config {
    /// Load and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| DatasetError::io(path, e))?;
        let config: Config =
            serde_json::from_str(&contents).map_err(|err| DatasetError::ConfigParse {
                path: path.to_path_buf(),
                err,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field, reporting all problems at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.vocab.size == 0 {
            errors.push("vocab.size must be greater than 0".to_string());
        }
        if self.vocab.max_size == 0 {
            errors.push("vocab.max_size must be greater than 0".to_string());
        }
        if self.vocab.language.is_empty() {
            errors.push("vocab.language must not be empty".to_string());
        }
        if self.training.max_seq_length < 3 {
            errors.push(
                "training.max_seq_length must be at least 3 to hold a sentence pair's special tokens"
                    .to_string(),
            );
        }
        if self.data.processing_minibatch_size == 0 {
            errors.push("data.processing_minibatch_size must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DatasetError::InvalidConfig(errors.join("; ")))
        }
    }

    /// Tokenizer settings derived from the `vocab` section.
    pub fn tokenizer_config(&self) -> TokenizerConfig {
        TokenizerConfig {
            vocab_size: self.vocab.size,
            min_frequency: self.vocab.min_frequency,
            lowercase: self.vocab.lowercase,
            language: self.vocab.language.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.vocab.size, 30_000);
        assert_eq!(config.training.max_seq_length, 512);
        assert_eq!(config.data.processing_minibatch_size, 10_000);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_sections() {
        let config: Config =
            serde_json::from_str(r#"{"vocab": {"max_size": 10}, "training": {"max_seq_length": 12}}"#)
                .unwrap();
        assert_eq!(config.vocab.max_size, 10);
        assert_eq!(config.vocab.size, 30_000);
        assert_eq!(config.training.max_seq_length, 12);
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let mut config = Config::default();
        config.vocab.language.clear();
        config.training.max_seq_length = 2;
        config.data.processing_minibatch_size = 0;

        match config.validate() {
            Err(DatasetError::InvalidConfig(message)) => {
                assert!(message.contains("vocab.language"));
                assert!(message.contains("training.max_seq_length"));
                assert!(message.contains("data.processing_minibatch_size"));
            }
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"vocab": {"lowercase": true, "language": "es"}}"#).unwrap();

        let config = Config::from_path(&path).unwrap();
        let tokenizer = config.tokenizer_config();
        assert!(tokenizer.lowercase);
        assert_eq!(tokenizer.language, "es");

        std::fs::write(&path, r#"{"vocab": 3}"#).unwrap();
        assert!(matches!(
            Config::from_path(&path),
            Err(DatasetError::ConfigParse { .. })
        ));
        assert!(matches!(
            Config::from_path(dir.path().join("missing.json")),
            Err(DatasetError::NotFound { .. })
        ));
    }
}
