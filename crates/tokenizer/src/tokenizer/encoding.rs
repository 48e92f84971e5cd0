//! BERT-style encodings.
//!
//! A single sequence is laid out as `[CLS] A [SEP]` and a pair as
//! `[CLS] A [SEP] B [SEP]`. With a target length, content is truncated
//! longest-first and the result is right-padded with `<pad>`.

use mlmprep_core::{Error, Result, Vocabulary};

/// Result of processing one or two sentences.
///
/// All five vectors have the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    /// Token IDs
    pub ids: Vec<u32>,
    /// Token strings, one per id
    pub tokens: Vec<String>,
    /// 1 for `[CLS]`, `[SEP]` and `<pad>`, 0 for content
    pub special_tokens_mask: Vec<u32>,
    /// 0 for padding, 1 elsewhere
    pub attention_mask: Vec<u32>,
    /// 0 for the first segment, 1 for the second
    pub type_ids: Vec<u32>,
}

impl Encoding {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
            tokens: Vec::with_capacity(capacity),
            special_tokens_mask: Vec::with_capacity(capacity),
            attention_mask: Vec::with_capacity(capacity),
            type_ids: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, vocab: &Vocabulary, id: u32, special: bool, attend: bool, type_id: u32) {
        self.ids.push(id);
        self.tokens
            .push(vocab.get_token(id).unwrap_or_default().to_string());
        self.special_tokens_mask.push(u32::from(special));
        self.attention_mask.push(u32::from(attend));
        self.type_ids.push(type_id);
    }

    /// Get the number of tokens.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the encoding is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Number of special tokens the template adds.
pub fn special_overhead(is_pair: bool) -> usize {
    if is_pair {
        3
    } else {
        2
    }
}

/// Drop content tokens, one at a time from the longer side, until both fit in
/// `budget`. Ties take from the first sequence.
fn truncate_longest_first(a: &mut Vec<u32>, b: &mut Option<Vec<u32>>, budget: usize) {
    loop {
        let b_len = b.as_ref().map_or(0, Vec::len);
        if a.len() + b_len <= budget {
            return;
        }
        match b {
            Some(b) if b.len() > a.len() => {
                b.pop();
            }
            _ => {
                a.pop();
            }
        }
    }
}

/// Lay out content ids with the special-token template.
pub fn assemble(
    vocab: &Vocabulary,
    mut a: Vec<u32>,
    mut b: Option<Vec<u32>>,
    max_seq_len: Option<usize>,
) -> Result<Encoding> {
    let overhead = special_overhead(b.is_some());

    if let Some(max_len) = max_seq_len {
        if max_len < overhead {
            return Err(Error::InvalidConfig(format!(
                "max_seq_len {max_len} cannot hold the {overhead} special tokens"
            )));
        }
        truncate_longest_first(&mut a, &mut b, max_len - overhead);
    }

    let special = vocab.special;
    let content = a.len() + b.as_ref().map_or(0, Vec::len) + overhead;
    let mut encoding = Encoding::with_capacity(max_seq_len.unwrap_or(content).max(content));

    encoding.push(vocab, special.cls, true, true, 0);
    for id in a {
        encoding.push(vocab, id, false, true, 0);
    }
    encoding.push(vocab, special.sep, true, true, 0);

    if let Some(b) = b {
        for id in b {
            encoding.push(vocab, id, false, true, 1);
        }
        encoding.push(vocab, special.sep, true, true, 1);
    }

    if let Some(max_len) = max_seq_len {
        while encoding.len() < max_len {
            encoding.push(vocab, special.pad, true, false, 0);
        }
    }

    Ok(encoding)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        let mut vocab = Vocabulary::new();
        for token in ["▁", "a", "b", "c"] {
            vocab.add_token(token);
        }
        vocab
    }

    #[test]
    fn test_single_layout() {
        let vocab = vocab();
        let encoding = assemble(&vocab, vec![5, 6], None, None).unwrap();

        assert_eq!(encoding.ids, vec![4, 5, 6, 3]);
        assert_eq!(encoding.tokens, vec!["[CLS]", "▁", "a", "[SEP]"]);
        assert_eq!(encoding.special_tokens_mask, vec![1, 0, 0, 1]);
        assert_eq!(encoding.attention_mask, vec![1, 1, 1, 1]);
        assert_eq!(encoding.type_ids, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_pair_layout_with_padding() {
        let vocab = vocab();
        let encoding = assemble(&vocab, vec![5, 6], Some(vec![7]), Some(8)).unwrap();

        assert_eq!(encoding.ids, vec![4, 5, 6, 3, 7, 3, 1, 1]);
        assert_eq!(encoding.special_tokens_mask, vec![1, 0, 0, 1, 0, 1, 1, 1]);
        assert_eq!(encoding.attention_mask, vec![1, 1, 1, 1, 1, 1, 0, 0]);
        assert_eq!(encoding.type_ids, vec![0, 0, 0, 0, 1, 1, 0, 0]);
    }

    #[test]
    fn test_truncation_keeps_trailing_separator() {
        let vocab = vocab();
        let encoding = assemble(&vocab, vec![5, 6, 7, 8, 6, 7], None, Some(5)).unwrap();

        assert_eq!(encoding.ids, vec![4, 5, 6, 7, 3]);
        assert_eq!(encoding.tokens.last().map(String::as_str), Some("[SEP]"));
    }

    #[test]
    fn test_pair_truncation_is_longest_first() {
        let vocab = vocab();
        let a = vec![5, 6, 7, 8];
        let b = vec![8, 7];

        // budget 4: a drops to 2 to match b
        let encoding = assemble(&vocab, a.clone(), Some(b.clone()), Some(7)).unwrap();
        assert_eq!(encoding.ids, vec![4, 5, 6, 3, 8, 7, 3]);

        // budget 3: on a tie the first sequence gives way
        let encoding = assemble(&vocab, a, Some(b), Some(6)).unwrap();
        assert_eq!(encoding.ids, vec![4, 5, 3, 8, 7, 3]);
    }

    #[test]
    fn test_too_short_for_specials() {
        let vocab = vocab();
        assert!(matches!(
            assemble(&vocab, vec![5], None, Some(1)),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            assemble(&vocab, vec![5], Some(vec![6]), Some(2)),
            Err(Error::InvalidConfig(_))
        ));

        let encoding = assemble(&vocab, vec![5, 6], None, Some(2)).unwrap();
        assert_eq!(encoding.ids, vec![4, 3]);
    }
}
