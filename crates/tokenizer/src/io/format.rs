//! Artifact naming and on-disk formats.
//!
//! A trained tokenizer is two files named after its language and size:
//! `<language>.bpe.<size>-vocab.json`, a JSON object from token to id written
//! in id order, and `<language>.bpe.<size>-merges.txt`, one `left right` pair
//! per line in rank order.

use mlmprep_core::Vocabulary;
use serde::ser::{Serialize, SerializeMap, Serializer};

const VOCAB_SUFFIX: &str = "-vocab.json";
const MERGES_SUFFIX: &str = "-merges.txt";
const INFIX: &str = ".bpe.";

/// File name of the vocabulary artifact.
pub fn vocab_file_name(language: &str, size: usize) -> String {
    format!("{language}{INFIX}{size}{VOCAB_SUFFIX}")
}

/// File name of the merges artifact.
pub fn merges_file_name(language: &str, size: usize) -> String {
    format!("{language}{INFIX}{size}{MERGES_SUFFIX}")
}

/// Parse a vocabulary artifact name back into `(language, size)`.
pub fn parse_vocab_file_name(name: &str) -> Option<(&str, usize)> {
    let stem = name.strip_suffix(VOCAB_SUFFIX)?;
    let (language, size) = stem.rsplit_once(INFIX)?;
    if language.is_empty() {
        return None;
    }
    let size = size.parse().ok()?;
    Some((language, size))
}

/// Serializes a vocabulary as a JSON object whose keys follow id order.
pub struct OrderedVocab<'a>(pub &'a Vocabulary);

impl Serialize for OrderedVocab<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, token) in self.0.iter().enumerate() {
            map.serialize_entry(token, &(id as u32))?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(vocab_file_name("ca", 38), "ca.bpe.38-vocab.json");
        assert_eq!(merges_file_name("ca", 38), "ca.bpe.38-merges.txt");
    }

    #[test]
    fn test_parse_vocab_file_name() {
        assert_eq!(parse_vocab_file_name("ca.bpe.38-vocab.json"), Some(("ca", 38)));
        assert_eq!(parse_vocab_file_name("pt.br.bpe.100-vocab.json"), Some(("pt.br", 100)));
        assert_eq!(parse_vocab_file_name("ca.bpe.38-merges.txt"), None);
        assert_eq!(parse_vocab_file_name("ca.bpe.x-vocab.json"), None);
        assert_eq!(parse_vocab_file_name(".bpe.38-vocab.json"), None);
    }

    #[test]
    fn test_ordered_vocab_keeps_id_order() {
        let mut vocab = Vocabulary::new();
        vocab.add_token("▁");
        vocab.add_token("z");
        vocab.add_token("a");

        let json = serde_json::to_string(&OrderedVocab(&vocab)).unwrap();
        assert_eq!(
            json,
            r#"{"<unk>":0,"<pad>":1,"[MASK]":2,"[SEP]":3,"[CLS]":4,"▁":5,"z":6,"a":7}"#
        );
    }
}
