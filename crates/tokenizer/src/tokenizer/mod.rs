//! Main tokenizer implementation.
//!
//! This module provides the high-level `Tokenizer` struct that ties together
//! normalization, metaspace splitting, the learned merges and the BERT
//! sentence template.

pub mod encoding;

pub use encoding::Encoding;

use crate::io::{ArtifactPaths, TokenizerLoader, TokenizerSaver};
use crate::pre_tokenizer::{Normalizer, Splitter};
use mlmprep_core::{merge_word, Error, MergeRules, Result, Vocabulary};
use mlmprep_training::{BpeTrainer, PairCounter, TrainingConfig};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// Configuration for building a tokenizer.
#[derive(Debug, Clone)]
pub struct TokenizerConfig {
    /// Target vocabulary size, special tokens included
    pub vocab_size: usize,
    /// Minimum frequency for merges during training
    pub min_frequency: u64,
    /// Lowercase text before training and encoding
    pub lowercase: bool,
    /// Language tag used in artifact names
    pub language: String,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            vocab_size: 30_000,
            min_frequency: 2,
            lowercase: false,
            language: "ca".to_string(),
        }
    }
}

/// Builder for creating a tokenizer.
#[derive(Clone)]
pub struct TokenizerBuilder {
    config: TokenizerConfig,
}

impl Default for TokenizerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenizerBuilder {
    /// Create a new tokenizer builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: TokenizerConfig::default(),
        }
    }

    /// Set the target vocabulary size.
    pub fn vocab_size(mut self, size: usize) -> Self {
        self.config.vocab_size = size;
        self
    }

    /// Set the minimum frequency for merges.
    pub fn min_frequency(mut self, freq: u64) -> Self {
        self.config.min_frequency = freq;
        self
    }

    /// Lowercase text before training and encoding.
    pub fn lowercase(mut self, lowercase: bool) -> Self {
        self.config.lowercase = lowercase;
        self
    }

    /// Set the language tag used in artifact names.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config.language = language.into();
        self
    }

    /// Build an untrained tokenizer that only knows the special tokens.
    pub fn build(self) -> Result<Tokenizer> {
        Tokenizer::new(self.config)
    }

    /// Train a tokenizer on a corpus file, one sentence per line.
    pub fn train_file(self, path: impl AsRef<Path>) -> Result<Tokenizer> {
        Tokenizer::train(path, self.config)
    }
}

/// Main tokenizer struct.
///
/// Immutable once trained or loaded, so it can be shared across threads by
/// reference.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    /// Vocabulary
    vocab: Vocabulary,
    /// Merge rules
    merges: MergeRules,
    /// Configuration
    config: TokenizerConfig,
    /// Unicode normalizer
    normalizer: Normalizer,
    /// Metaspace splitter
    splitter: Splitter,
}

impl Tokenizer {
    /// Create an untrained tokenizer with the given configuration.
    pub fn new(config: TokenizerConfig) -> Result<Self> {
        Self::validate_config(&config)?;
        Ok(Self::from_parts(Vocabulary::new(), MergeRules::new(), config))
    }

    /// Create a tokenizer builder.
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    fn from_parts(vocab: Vocabulary, merges: MergeRules, config: TokenizerConfig) -> Self {
        let normalizer = Normalizer::nfkc(config.lowercase);
        Self {
            vocab,
            merges,
            config,
            normalizer,
            splitter: Splitter::metaspace(),
        }
    }

    fn validate_config(config: &TokenizerConfig) -> Result<()> {
        if config.vocab_size == 0 {
            return Err(Error::InvalidConfig("vocab_size must be > 0".to_string()));
        }
        if config.language.is_empty() {
            return Err(Error::InvalidConfig("language must not be empty".to_string()));
        }
        Ok(())
    }

    /// Train a tokenizer on a corpus file, one sentence per line.
    ///
    /// The file is streamed. Blank lines are skipped, and a corpus with no
    /// usable line is a training error.
    pub fn train(path: impl AsRef<Path>, config: TokenizerConfig) -> Result<Self> {
        let path = path.as_ref();
        Self::validate_config(&config)?;

        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(path.to_path_buf())
            } else {
                Error::io(path, e)
            }
        })?;

        info!(
            corpus = %path.display(),
            vocab_size = config.vocab_size,
            min_frequency = config.min_frequency,
            lowercase = config.lowercase,
            "training tokenizer"
        );

        let tokenizer = Self::from_parts(Vocabulary::new(), MergeRules::new(), config);
        let mut vocab = Vocabulary::new();
        let mut counter = PairCounter::new();

        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| Error::io(path, e))?;
            for word in tokenizer.pre_tokenize(&line) {
                counter.add_word(&word, &mut vocab);
            }
        }

        if counter.word_count() == 0 {
            return Err(Error::Training(format!(
                "{} contains no usable line",
                path.display()
            )));
        }

        let trainer = BpeTrainer::new(TrainingConfig {
            vocab_size: tokenizer.config.vocab_size,
            min_frequency: tokenizer.config.min_frequency,
            parallel: true,
        });
        let (vocab, merges) = trainer.train(counter, vocab)?;

        Ok(Self::from_parts(vocab, merges, tokenizer.config))
    }

    /// Train on in-memory lines.
    pub fn train_from_lines<I, S>(lines: I, config: TokenizerConfig) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::validate_config(&config)?;
        let tokenizer = Self::from_parts(Vocabulary::new(), MergeRules::new(), config);

        let words: Vec<String> = lines
            .into_iter()
            .flat_map(|line| tokenizer.pre_tokenize(line.as_ref()))
            .collect();

        let trainer = BpeTrainer::new(TrainingConfig {
            vocab_size: tokenizer.config.vocab_size,
            min_frequency: tokenizer.config.min_frequency,
            parallel: true,
        });
        let (vocab, merges) = trainer.train_words(words)?;

        Ok(Self::from_parts(vocab, merges, tokenizer.config))
    }

    /// Normalize and split text into metaspace-prefixed words.
    pub fn pre_tokenize(&self, text: &str) -> Vec<String> {
        self.splitter.split(&self.normalizer.normalize(text))
    }

    /// Encode text to content token IDs, without special tokens.
    ///
    /// Characters never seen in training map to `<unk>`.
    pub fn encode(&self, text: &str) -> Vec<u32> {
        let mut ids = Vec::new();
        let mut buf = [0u8; 4];
        for word in self.pre_tokenize(text) {
            let symbols: Vec<u32> = word
                .chars()
                .map(|c| {
                    self.vocab
                        .get_id(c.encode_utf8(&mut buf))
                        .unwrap_or(self.vocab.special.unk)
                })
                .collect();
            ids.extend(merge_word(&symbols, &self.merges));
        }
        ids
    }

    /// Encode one sentence, or a pair, with the BERT template.
    ///
    /// With `max_seq_len` the result has exactly that length: content is
    /// truncated longest-first and short sequences are padded.
    pub fn process(
        &self,
        text_a: &str,
        text_b: Option<&str>,
        max_seq_len: Option<usize>,
    ) -> Result<Encoding> {
        let a = self.encode(text_a);
        let b = text_b.map(|text| self.encode(text));
        encoding::assemble(&self.vocab, a, b, max_seq_len)
    }

    /// Process a batch of single sentences (parallelized). Output order
    /// matches input order.
    pub fn process_batch(
        &self,
        texts: &[String],
        max_seq_len: Option<usize>,
    ) -> Result<Vec<Encoding>> {
        use rayon::prelude::*;

        texts
            .par_iter()
            .map(|text| self.process(text, None, max_seq_len))
            .collect::<std::result::Result<Vec<_>, _>>()
    }

    /// Decode token IDs back to text.
    ///
    /// # Arguments
    /// * `ids` - The token IDs to decode
    /// * `skip_special_tokens` - Whether to skip special tokens during decoding
    pub fn decode(&self, ids: &[u32], skip_special_tokens: bool) -> Result<String> {
        let mut joined = String::new();
        for &id in ids {
            let token = self.vocab.token(id)?;
            if skip_special_tokens && self.vocab.special.is_special(id) {
                continue;
            }
            joined.push_str(token);
        }
        Ok(self.splitter.restore(&joined))
    }

    /// Token string for an id.
    pub fn id_to_token(&self, id: u32) -> Result<&str> {
        self.vocab.token(id)
    }

    /// Id for a token string.
    pub fn token_to_id(&self, token: &str) -> Option<u32> {
        self.vocab.get_id(token)
    }

    /// Vocabulary size, special tokens included.
    pub fn len(&self) -> usize {
        self.vocab.len()
    }

    /// Always false: the special tokens are always present.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Get a reference to the vocabulary.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Get a reference to the merge rules.
    pub fn merges(&self) -> &MergeRules {
        &self.merges
    }

    /// Get the configuration.
    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Save the vocabulary and merges artifacts into `dir`.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<ArtifactPaths> {
        TokenizerSaver::new(&self.vocab, &self.merges, &self.config.language).save(dir.as_ref())
    }

    /// Load a tokenizer from `dir`.
    ///
    /// `vocab_size` selects the artifact; without it the directory must hold
    /// exactly one. Normalization is not stored in the artifacts, so the
    /// caller passes the same `lowercase` flag used at training time.
    pub fn load(dir: impl AsRef<Path>, vocab_size: Option<usize>, lowercase: bool) -> Result<Self> {
        let loaded = TokenizerLoader::load(dir.as_ref(), vocab_size)?;
        let config = TokenizerConfig {
            vocab_size: loaded.vocab.len(),
            min_frequency: TokenizerConfig::default().min_frequency,
            lowercase,
            language: loaded.language,
        };
        Ok(Self::from_parts(loaded.vocab, loaded.merges, config))
    }
}
