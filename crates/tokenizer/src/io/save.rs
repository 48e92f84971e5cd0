//! Save functionality for trained tokenizers.

use super::format::{merges_file_name, vocab_file_name, OrderedVocab};
use mlmprep_core::{Error, MergeRules, Result, Vocabulary};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Paths of the two artifacts written by [`TokenizerSaver::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub vocab: PathBuf,
    pub merges: PathBuf,
}

/// Tokenizer saver - handles saving trained models.
pub struct TokenizerSaver<'a> {
    /// Vocabulary reference
    vocab: &'a Vocabulary,
    /// Merge rules reference
    merges: &'a MergeRules,
    /// Language tag used in the artifact names
    language: &'a str,
}

impl<'a> TokenizerSaver<'a> {
    /// Create a new tokenizer saver.
    pub fn new(vocab: &'a Vocabulary, merges: &'a MergeRules, language: &'a str) -> Self {
        Self {
            vocab,
            merges,
            language,
        }
    }

    /// Write the vocabulary and merges artifacts into `dir`, creating it if
    /// needed. Existing artifacts of the same size are overwritten.
    pub fn save(&self, dir: &Path) -> Result<ArtifactPaths> {
        std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

        let size = self.vocab.len();
        let vocab_path = dir.join(vocab_file_name(self.language, size));
        let merges_path = dir.join(merges_file_name(self.language, size));

        self.write_vocab(&vocab_path)?;
        self.write_merges(&merges_path)?;

        info!(
            vocab = %vocab_path.display(),
            merges = %merges_path.display(),
            size,
            "saved tokenizer"
        );

        Ok(ArtifactPaths {
            vocab: vocab_path,
            merges: merges_path,
        })
    }

    fn write_vocab(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &OrderedVocab(self.vocab))
            .map_err(|e| Error::Save(format!("Failed to serialize vocab: {e}")))?;
        writer.flush().map_err(|e| Error::io(path, e))
    }

    fn write_merges(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        let mut writer = BufWriter::new(file);

        for ((left, right), _) in self.merges.iter() {
            let left = self.vocab.token(left)?;
            let right = self.vocab.token(right)?;
            writeln!(writer, "{left} {right}").map_err(|e| Error::io(path, e))?;
        }

        writer.flush().map_err(|e| Error::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_writes_two_artifacts() {
        let dir = tempfile::tempdir().unwrap();

        let mut vocab = Vocabulary::new();
        let space = vocab.add_token("▁");
        let a = vocab.add_token("a");
        let merged = vocab.add_token("▁a");
        let mut merges = MergeRules::new();
        merges.push((space, a), merged).unwrap();

        let paths = TokenizerSaver::new(&vocab, &merges, "ca")
            .save(dir.path())
            .unwrap();

        assert_eq!(paths.vocab, dir.path().join("ca.bpe.8-vocab.json"));
        assert_eq!(paths.merges, dir.path().join("ca.bpe.8-merges.txt"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);

        let merges_text = std::fs::read_to_string(&paths.merges).unwrap();
        assert_eq!(merges_text, "▁ a\n");
    }
}
