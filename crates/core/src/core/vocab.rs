//! Vocabulary storage and lookup.
//!
//! Ids are dense: the reverse table is a plain `Vec` indexed by id, and the
//! forward table maps token strings back to those ids. The five special tokens
//! always occupy ids 0 through 4, in the order given by [`SpecialTokens`].

use crate::error::{Error, Result};
use ahash::AHashMap;
use compact_str::CompactString;

/// Forward mapping: token string -> ID
pub type Vocab = AHashMap<CompactString, u32>;

/// Reverse mapping: ID -> token string (dense, indexed by ID)
pub type VocabR = Vec<CompactString>;

pub const UNK_TOKEN: &str = "<unk>";
pub const PAD_TOKEN: &str = "<pad>";
pub const MASK_TOKEN: &str = "[MASK]";
pub const SEP_TOKEN: &str = "[SEP]";
pub const CLS_TOKEN: &str = "[CLS]";

/// Special tokens in reservation order. Position in this array is the id.
pub const SPECIAL_TOKENS: [&str; 5] = [UNK_TOKEN, PAD_TOKEN, MASK_TOKEN, SEP_TOKEN, CLS_TOKEN];

/// Vocabulary with forward and reverse mappings.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Forward mapping: token string -> ID
    pub vocab: Vocab,
    /// Reverse mapping: ID -> token string
    pub vocab_r: VocabR,
    /// Special token IDs (cached for fast access)
    pub special: SpecialTokens,
}

impl Vocabulary {
    /// Create a vocabulary holding only the reserved special tokens.
    pub fn new() -> Self {
        Self::with_capacity(SPECIAL_TOKENS.len())
    }

    /// Create a vocabulary with the special tokens reserved and room for
    /// `capacity` entries in total.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut vocab = Self {
            vocab: Vocab::with_capacity(capacity),
            vocab_r: VocabR::with_capacity(capacity),
            special: SpecialTokens::default(),
        };
        for token in SPECIAL_TOKENS {
            vocab.push(CompactString::new(token));
        }
        vocab
    }

    /// Rebuild a vocabulary from an id-ordered token list, as read from disk.
    ///
    /// The list must start with the reserved special tokens and must not
    /// contain duplicates.
    pub fn from_ordered_tokens<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocab = Self {
            vocab: Vocab::new(),
            vocab_r: VocabR::new(),
            special: SpecialTokens::default(),
        };

        for token in tokens {
            let token = token.as_ref();
            if vocab.vocab.contains_key(token) {
                return Err(Error::Load(format!("duplicate token in vocabulary: {token:?}")));
            }
            vocab.push(CompactString::new(token));
        }

        for (id, expected) in SPECIAL_TOKENS.iter().enumerate() {
            match vocab.vocab_r.get(id) {
                Some(found) if found == expected => {}
                Some(found) => {
                    return Err(Error::Load(format!(
                        "expected special token {expected} at id {id}, found {found:?}"
                    )))
                }
                None => {
                    return Err(Error::Load(format!(
                        "vocabulary is missing special token {expected} at id {id}"
                    )))
                }
            }
        }

        Ok(vocab)
    }

    fn push(&mut self, token: CompactString) -> u32 {
        let id = self.vocab_r.len() as u32;
        self.vocab.insert(token.clone(), id);
        self.vocab_r.push(token);
        id
    }

    /// Add a token to the vocabulary.
    ///
    /// Returns the ID assigned to the token, or the existing ID if the token
    /// is already present.
    pub fn add_token(&mut self, token: &str) -> u32 {
        if let Some(&id) = self.vocab.get(token) {
            return id;
        }
        self.push(CompactString::new(token))
    }

    /// Get the ID for a token string.
    #[inline]
    pub fn get_id(&self, token: &str) -> Option<u32> {
        self.vocab.get(token).copied()
    }

    /// Get the token string for an ID.
    #[inline]
    pub fn get_token(&self, id: u32) -> Option<&str> {
        self.vocab_r.get(id as usize).map(|s| s.as_str())
    }

    /// Like [`get_token`](Self::get_token), but out-of-range ids are an error.
    pub fn token(&self, id: u32) -> Result<&str> {
        self.get_token(id).ok_or(Error::UnknownTokenId {
            id,
            len: self.len(),
        })
    }

    /// Get the size of the vocabulary, special tokens included.
    #[inline]
    pub fn len(&self) -> usize {
        self.vocab_r.len()
    }

    /// A vocabulary always carries its special tokens, so this is only true
    /// for a value built by hand.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vocab_r.is_empty()
    }

    /// Tokens in id order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.vocab_r.iter().map(|s| s.as_str())
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

/// Special token IDs.
///
/// The reservation order is fixed, so these never change between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialTokens {
    /// Unknown token ID
    pub unk: u32,
    /// Padding token ID
    pub pad: u32,
    /// Mask token ID
    pub mask: u32,
    /// Sentence separator token ID
    pub sep: u32,
    /// Sentence start token ID
    pub cls: u32,
}

impl Default for SpecialTokens {
    fn default() -> Self {
        Self {
            unk: 0,
            pad: 1,
            mask: 2,
            sep: 3,
            cls: 4,
        }
    }
}

impl SpecialTokens {
    /// Check if an ID is a special token.
    #[inline]
    pub fn is_special(&self, id: u32) -> bool {
        (id as usize) < SPECIAL_TOKENS.len()
    }
}
