//! Metaspace word splitting.
//!
//! Text is split on Unicode whitespace and every word is prefixed with the
//! metaspace marker, so word boundaries survive inside the subword tokens and
//! can be restored on decode.

/// Word-boundary marker prepended to every word (U+2581).
pub const METASPACE: char = '\u{2581}';

/// Text splitter for pre-tokenization.
#[derive(Debug, Clone, Copy, Default)]
pub struct Splitter;

impl Splitter {
    /// Create a metaspace splitter.
    pub fn metaspace() -> Self {
        Self
    }

    /// Split text into metaspace-prefixed words.
    pub fn split(&self, text: &str) -> Vec<String> {
        text.split_whitespace()
            .map(|word| {
                let mut out = String::with_capacity(word.len() + METASPACE.len_utf8());
                out.push(METASPACE);
                out.push_str(word);
                out
            })
            .collect()
    }

    /// Turn a joined token string back into text.
    pub fn restore(&self, joined: &str) -> String {
        let text = joined.replace(METASPACE, " ");
        match text.strip_prefix(' ') {
            Some(rest) => rest.to_string(),
            None => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metaspace_split() {
        let splitter = Splitter::metaspace();
        assert_eq!(splitter.split("Hola"), vec!["▁Hola"]);
        assert_eq!(
            splitter.split("  hola\tcom\u{00A0}anem \n"),
            vec!["▁hola", "▁com", "▁anem"]
        );
    }

    #[test]
    fn test_empty_string() {
        let splitter = Splitter::metaspace();
        assert!(splitter.split("").is_empty());
        assert!(splitter.split(" \t ").is_empty());
    }

    #[test]
    fn test_restore() {
        let splitter = Splitter::metaspace();
        assert_eq!(splitter.restore("▁hola▁com▁an em"), "hola com an em");
        assert_eq!(splitter.restore("ola"), "ola");
        assert_eq!(splitter.restore(""), "");
    }
}
