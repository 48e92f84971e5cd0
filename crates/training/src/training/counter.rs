//! Pair counting for BPE training.
//!
//! Words are deduplicated and weighted by their corpus frequency. The counter
//! also remembers which words contain which pair, so a merge only revisits the
//! words it can change.
//!
//! Distinct words are indexed in first-occurrence order, so the earliest
//! corpus occurrence of a pair is its smallest `(word index, offset)`.

use ahash::{AHashMap, AHashSet};
use mlmprep_core::{Pair, Position, Vocabulary};
use std::collections::BTreeSet;

/// Counter for BPE pair frequencies.
pub struct PairCounter {
    /// Word -> index into `words`
    word_index: AHashMap<String, usize>,
    /// Word -> tokenized representation (as token IDs)
    words: Vec<Vec<u32>>,
    /// Word -> character offset where each symbol starts
    offsets: Vec<Vec<u32>>,
    /// Word -> frequency count
    word_counts: Vec<u64>,
    /// Pair -> indices of the words that (may) contain it
    pair_words: AHashMap<Pair, BTreeSet<usize>>,
}

impl PairCounter {
    /// Create a new pair counter.
    pub fn new() -> Self {
        Self {
            word_index: AHashMap::new(),
            words: Vec::new(),
            offsets: Vec::new(),
            word_counts: Vec::new(),
            pair_words: AHashMap::new(),
        }
    }

    /// Add a single pre-tokenized word to the counter.
    ///
    /// Characters not yet in `vocab` are added to it, so the alphabet ends up
    /// in first-seen order.
    pub fn add_word(&mut self, word: &str, vocab: &mut Vocabulary) {
        if word.is_empty() {
            return;
        }
        if let Some(&idx) = self.word_index.get(word) {
            self.word_counts[idx] += 1;
            return;
        }

        let mut buf = [0u8; 4];
        let word_tokens: Vec<u32> = word
            .chars()
            .map(|c| vocab.add_token(c.encode_utf8(&mut buf)))
            .collect();

        let idx = self.words.len();
        for window in word_tokens.windows(2) {
            self.pair_words
                .entry((window[0], window[1]))
                .or_default()
                .insert(idx);
        }
        self.word_index.insert(word.to_string(), idx);
        self.offsets.push((0..word_tokens.len() as u32).collect());
        self.words.push(word_tokens);
        self.word_counts.push(1);
    }

    /// Count all pairs in parallel.
    ///
    /// This returns a map of pair -> frequency count across all words.
    pub fn count_pairs_parallel(&self) -> AHashMap<Pair, u64> {
        use rayon::prelude::*;

        self.words
            .par_iter()
            .zip(self.word_counts.par_iter())
            .map(|(word, &count)| {
                let mut pair_counts: AHashMap<Pair, u64> = AHashMap::new();

                for window in word.windows(2) {
                    let pair = (window[0], window[1]);
                    *pair_counts.entry(pair).or_insert(0) += count;
                }

                pair_counts
            })
            .reduce(AHashMap::new, |mut acc, pair_counts| {
                for (pair, count) in pair_counts {
                    *acc.entry(pair).or_insert(0) += count;
                }
                acc
            })
    }

    /// Count all pairs sequentially.
    pub fn count_pairs_sequential(&self) -> AHashMap<Pair, u64> {
        let mut pair_counts: AHashMap<Pair, u64> = AHashMap::new();

        for (word, &count) in self.words.iter().zip(self.word_counts.iter()) {
            for window in word.windows(2) {
                let pair = (window[0], window[1]);
                *pair_counts.entry(pair).or_insert(0) += count;
            }
        }

        pair_counts
    }

    /// Distinct pairs with their first position, in the order a
    /// left-to-right scan of the corpus meets them.
    ///
    /// A repeated word cannot introduce a new pair, so scanning the distinct
    /// words is enough.
    pub fn first_positions(&self) -> Vec<(Pair, Position)> {
        let mut seen = AHashSet::new();
        let mut ordered = Vec::new();
        for (idx, word) in self.words.iter().enumerate() {
            for (i, window) in word.windows(2).enumerate() {
                let pair = (window[0], window[1]);
                if seen.insert(pair) {
                    ordered.push((pair, (idx, self.offsets[idx][i] as usize)));
                }
            }
        }
        ordered
    }

    /// Current first position of `pair` in the corpus, or `None` once no word
    /// contains it.
    ///
    /// Word indices that no longer hold the pair are pruned along the way.
    pub fn first_position(&mut self, pair: Pair) -> Option<Position> {
        let indices = self.pair_words.get_mut(&pair)?;

        let mut stale = Vec::new();
        let mut found = None;
        for &idx in indices.iter() {
            let word = &self.words[idx];
            match word.windows(2).position(|w| (w[0], w[1]) == pair) {
                Some(i) => {
                    found = Some((idx, self.offsets[idx][i] as usize));
                    break;
                }
                None => stale.push(idx),
            }
        }
        for idx in stale {
            indices.remove(&idx);
        }
        if indices.is_empty() {
            self.pair_words.remove(&pair);
        }
        found
    }

    /// Get the number of unique words.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Get the total count of all word occurrences.
    pub fn total_word_occurrences(&self) -> u64 {
        self.word_counts.iter().sum()
    }

    /// Get a reference to the words.
    pub fn words(&self) -> &[Vec<u32>] {
        &self.words
    }

    /// Get a reference to the word counts.
    pub fn word_counts(&self) -> &[u64] {
        &self.word_counts
    }

    /// Merge a pair in every word that contains it (mutates words in place).
    ///
    /// Returns the changes to pair counts as (pair, delta) tuples, weighted by
    /// word frequency, in the order they were produced. The merged pair itself
    /// is left out: it no longer exists after this call.
    pub fn merge_pair_in_words(&mut self, pair: Pair, new_token_id: u32) -> Vec<(Pair, i64)> {
        let mut changes: Vec<(Pair, i64)> = Vec::new();

        let Some(indices) = self.pair_words.remove(&pair) else {
            return changes;
        };
        let mut indices: Vec<usize> = indices.into_iter().collect();
        indices.sort_unstable();

        for idx in indices {
            let count = self.word_counts[idx] as i64;
            let word = &mut self.words[idx];
            let offsets = &mut self.offsets[idx];
            let mut created: Vec<Pair> = Vec::new();
            let mut i = 0;

            while i + 1 < word.len() {
                if word[i] == pair.0 && word[i + 1] == pair.1 {
                    if i > 0 {
                        let old_pair = (word[i - 1], word[i]);
                        let new_pair = (word[i - 1], new_token_id);
                        if old_pair != pair {
                            changes.push((old_pair, -count));
                        }
                        changes.push((new_pair, count));
                        created.push(new_pair);
                    }
                    if i + 2 < word.len() {
                        let old_pair = (word[i + 1], word[i + 2]);
                        let new_pair = (new_token_id, word[i + 2]);
                        if old_pair != pair {
                            changes.push((old_pair, -count));
                        }
                        changes.push((new_pair, count));
                        created.push(new_pair);
                    }

                    word[i] = new_token_id;
                    word.remove(i + 1);
                    offsets.remove(i + 1);
                }
                i += 1;
            }

            for new_pair in created {
                self.pair_words.entry(new_pair).or_default().insert(idx);
            }
        }

        changes
    }
}

impl Default for PairCounter {
    fn default() -> Self {
        Self::new()
    }
}
