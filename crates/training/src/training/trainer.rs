//! BPE trainer implementation.
//!
//! Frequency-based induction: the most frequent adjacent pair is merged until
//! the vocabulary reaches its target size or no pair is frequent enough.
//! Training is fully deterministic for a given word sequence.

use super::counter::PairCounter;
use ahash::AHashMap;
use mlmprep_core::{
    Error, MergeCandidate, MergeRules, Pair, PairPriorityQueue, Result, Vocabulary, SPECIAL_TOKENS,
};
use tracing::{debug, info};

/// Configuration for BPE training.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Target vocabulary size, special tokens included
    pub vocab_size: usize,
    /// Minimum frequency for a pair to be merged
    pub min_frequency: u64,
    /// Whether to count the initial pairs in parallel
    pub parallel: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            vocab_size: 30_000,
            min_frequency: 2,
            parallel: true,
        }
    }
}

/// BPE trainer.
///
/// Trains a BPE tokenizer from pre-tokenized words by iteratively merging the
/// most frequent symbol pairs.
pub struct BpeTrainer {
    /// Configuration
    config: TrainingConfig,
}

impl BpeTrainer {
    /// Create a new BPE trainer with the given configuration.
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Create a new BPE trainer with default configuration.
    pub fn with_vocab_size(vocab_size: usize) -> Self {
        Self::new(TrainingConfig {
            vocab_size,
            ..Default::default()
        })
    }

    /// Train on a sequence of pre-tokenized words.
    pub fn train_words<I, S>(&self, words: I) -> Result<(Vocabulary, MergeRules)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocab = Vocabulary::new();
        let mut counter = PairCounter::new();
        for word in words {
            counter.add_word(word.as_ref(), &mut vocab);
        }
        self.train(counter, vocab)
    }

    /// Train from a filled counter.
    ///
    /// `vocab` must be the vocabulary the counter's words were added against:
    /// the special tokens followed by the alphabet.
    pub fn train(
        &self,
        mut counter: PairCounter,
        mut vocab: Vocabulary,
    ) -> Result<(Vocabulary, MergeRules)> {
        if counter.word_count() == 0 {
            return Err(Error::Training(
                "corpus contains no usable text".to_string(),
            ));
        }

        info!(
            words = counter.word_count(),
            occurrences = counter.total_word_occurrences(),
            alphabet = vocab.len() - SPECIAL_TOKENS.len(),
            target = self.config.vocab_size,
            "starting BPE induction"
        );

        let mut pair_counts = if self.config.parallel {
            counter.count_pairs_parallel()
        } else {
            counter.count_pairs_sequential()
        };

        // Ties go to the pair a left-to-right corpus scan meets first, so
        // positions come from a sequential scan however the counts were gathered.
        let mut queue = PairPriorityQueue::with_capacity(pair_counts.len());
        for (pair, position) in counter.first_positions() {
            if let Some(&count) = pair_counts.get(&pair) {
                queue.push(MergeCandidate::new(pair, count, position));
            }
        }

        let mut merges = MergeRules::new();

        while vocab.len() < self.config.vocab_size {
            let Some(candidate) = queue.pop() else {
                break;
            };

            if candidate.count < self.config.min_frequency {
                break;
            }
            if merges.contains(candidate.pair) {
                continue;
            }

            let new_token = format!(
                "{}{}",
                vocab.token(candidate.pair.0)?,
                vocab.token(candidate.pair.1)?
            );
            let new_token_id = vocab.add_token(&new_token);
            let rank = merges.push(candidate.pair, new_token_id)?;
            debug!(rank, token = %new_token, count = candidate.count, "learned merge");

            pair_counts.remove(&candidate.pair);
            let changes = counter.merge_pair_in_words(candidate.pair, new_token_id);
            Self::apply_changes(&mut counter, &mut pair_counts, &mut queue, changes);
        }

        info!(
            vocab_size = vocab.len(),
            merges = merges.len(),
            "finished BPE induction"
        );

        Ok((vocab, merges))
    }

    /// Fold count deltas from a merge into the counts and the queue.
    ///
    /// Every touched pair gets its first position recomputed, since a merge
    /// can move it even when the net count is unchanged.
    fn apply_changes(
        counter: &mut PairCounter,
        pair_counts: &mut AHashMap<Pair, u64>,
        queue: &mut PairPriorityQueue,
        changes: Vec<(Pair, i64)>,
    ) {
        let mut touched: Vec<Pair> = Vec::new();
        let mut aggregated: AHashMap<Pair, i64> = AHashMap::new();
        for (pair, delta) in changes {
            let entry = aggregated.entry(pair).or_insert_with(|| {
                touched.push(pair);
                0
            });
            *entry += delta;
        }

        for pair in touched {
            let delta = aggregated.get(&pair).copied().unwrap_or(0);
            let current = pair_counts.get(&pair).copied().unwrap_or(0);
            let new_count = (current as i64 + delta).max(0) as u64;

            match counter.first_position(pair) {
                Some(position) if new_count > 0 => {
                    pair_counts.insert(pair, new_count);
                    queue.update(pair, new_count, position);
                }
                _ => {
                    pair_counts.remove(&pair);
                    queue.update(pair, 0, (0, 0));
                }
            }
        }
    }
}
