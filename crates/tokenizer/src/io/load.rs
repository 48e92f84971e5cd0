//! Load functionality for trained tokenizers.

use super::format::{merges_file_name, parse_vocab_file_name, vocab_file_name};
use mlmprep_core::{Error, MergeRules, Result, Vocabulary};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// A loaded vocabulary with its merges and the language it was saved under.
pub struct LoadedModel {
    pub vocab: Vocabulary,
    pub merges: MergeRules,
    pub language: String,
}

/// Tokenizer loader - handles loading trained models.
pub struct TokenizerLoader;

impl TokenizerLoader {
    /// Load the artifacts in `dir`.
    ///
    /// With `Some(size)` the artifact for exactly that vocabulary size is
    /// opened. With `None` the directory must hold exactly one vocabulary
    /// artifact.
    pub fn load(dir: &Path, size: Option<usize>) -> Result<LoadedModel> {
        let (language, size) = Self::find_artifact(dir, size)?;

        let vocab_path = dir.join(vocab_file_name(&language, size));
        let merges_path = dir.join(merges_file_name(&language, size));
        if !merges_path.is_file() {
            return Err(Error::NotFound(merges_path));
        }

        let vocab = Self::read_vocab(&vocab_path)?;
        if vocab.len() != size {
            return Err(Error::Load(format!(
                "{} holds {} tokens but is named for {}",
                vocab_path.display(),
                vocab.len(),
                size
            )));
        }
        let merges = Self::read_merges(&merges_path, &vocab)?;

        info!(
            dir = %dir.display(),
            language = %language,
            size,
            merges = merges.len(),
            "loaded tokenizer"
        );

        Ok(LoadedModel {
            vocab,
            merges,
            language,
        })
    }

    fn find_artifact(dir: &Path, size: Option<usize>) -> Result<(String, usize)> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(dir.to_path_buf())
            } else {
                Error::io(dir, e)
            }
        })?;

        let mut found: Vec<(String, usize)> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(dir, e))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some((language, artifact_size)) = parse_vocab_file_name(name) {
                if size.map_or(true, |wanted| wanted == artifact_size) {
                    found.push((language.to_string(), artifact_size));
                }
            }
        }
        found.sort();

        match found.len() {
            0 => {
                let missing = match size {
                    Some(size) => dir.join(format!("*.bpe.{size}-vocab.json")),
                    None => dir.join("*-vocab.json"),
                };
                Err(Error::NotFound(missing))
            }
            1 => Ok(found.remove(0)),
            _ => Err(Error::InvalidConfig(format!(
                "{} holds {} tokenizers ({}); pass a vocabulary size",
                dir.display(),
                found.len(),
                found
                    .iter()
                    .map(|(language, size)| vocab_file_name(language, *size))
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }

    fn read_vocab(path: &Path) -> Result<Vocabulary> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let vocab_map: HashMap<String, u32> = serde_json::from_reader(BufReader::new(file))?;

        let mut by_id: Vec<(u32, String)> = vocab_map.into_iter().map(|(t, id)| (id, t)).collect();
        by_id.sort_unstable();

        for (expected, (id, token)) in by_id.iter().enumerate() {
            if *id as usize != expected {
                return Err(Error::Load(format!(
                    "vocabulary ids are not contiguous: expected id {expected}, found {id} for {token:?}"
                )));
            }
        }

        Vocabulary::from_ordered_tokens(by_id.into_iter().map(|(_, token)| token))
    }

    fn read_merges(path: &Path, vocab: &Vocabulary) -> Result<MergeRules> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut merges = MergeRules::new();

        for (line_num, line) in content.lines().enumerate() {
            if line.is_empty() || line.starts_with("#version") {
                continue;
            }

            let (left, right) = line.split_once(' ').ok_or_else(|| {
                Error::Load(format!(
                    "Invalid merge format at line {}: '{}'",
                    line_num + 1,
                    line
                ))
            })?;

            let lookup = |token: &str| {
                vocab.get_id(token).ok_or_else(|| {
                    Error::Load(format!(
                        "Unknown token in merges at line {}: {}",
                        line_num + 1,
                        token
                    ))
                })
            };
            let left_id = lookup(left)?;
            let right_id = lookup(right)?;
            let new_id = lookup(format!("{left}{right}").as_str())?;

            merges.push((left_id, right_id), new_id)?;
        }

        Ok(merges)
    }
}
