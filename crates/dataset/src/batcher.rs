//! Streaming minibatch reader over a line-oriented text file.

use crate::error::{DatasetError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Lazily yields minibatches of up to `batch_size` non-blank lines.
///
/// Trailing `\r`/`\n` are stripped. The last batch may be shorter. After an
/// I/O error the error is yielded once and the iterator ends; it cannot be
/// restarted.
pub struct LineBatcher<R = BufReader<File>> {
    reader: R,
    path: PathBuf,
    batch_size: usize,
    done: bool,
}

impl LineBatcher {
    /// Open `path` for batched reading.
    pub fn open(path: impl AsRef<Path>, batch_size: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| DatasetError::io(path, e))?;
        Self::from_reader(BufReader::new(file), path, batch_size)
    }
}

impl<R: BufRead> LineBatcher<R> {
    /// Batch lines from any buffered reader. `path` only labels errors.
    pub fn from_reader(reader: R, path: impl Into<PathBuf>, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(DatasetError::InvalidConfig(
                "minibatch size must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            reader,
            path: path.into(),
            batch_size,
            done: false,
        })
    }

    fn fill(&mut self) -> Result<Vec<String>> {
        let mut batch = Vec::with_capacity(self.batch_size);
        while batch.len() < self.batch_size {
            let mut line = String::new();
            let read = self
                .reader
                .read_line(&mut line)
                .map_err(|e| DatasetError::io(&self.path, e))?;
            if read == 0 {
                self.done = true;
                break;
            }
            trim_line(&mut line);
            if line.trim().is_empty() {
                continue;
            }
            batch.push(line);
        }
        Ok(batch)
    }
}

impl<R: BufRead> Iterator for LineBatcher<R> {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.fill() {
            Ok(batch) if batch.is_empty() => None,
            Ok(batch) => Some(Ok(batch)),
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

fn trim_line(line: &mut String) {
    while line.ends_with(['\r', '\n']) {
        line.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn batches(text: &str, size: usize) -> Vec<Vec<String>> {
        LineBatcher::from_reader(Cursor::new(text.as_bytes().to_vec()), "mem", size)
            .unwrap()
            .map(|batch| batch.unwrap())
            .collect()
    }

    #[test]
    fn test_batches_and_short_tail() {
        let out = batches("a\nb\nc\nd\ne\n", 2);
        assert_eq!(out, vec![vec!["a", "b"], vec!["c", "d"], vec!["e"]]);
    }

    #[test]
    fn test_strips_line_endings_and_skips_blank_lines() {
        let out = batches("a\r\n\r\n   \nb c\n\t\nd", 10);
        assert_eq!(out, vec![vec!["a", "b c", "d"]]);
    }

    #[test]
    fn test_exact_multiple_has_no_empty_tail() {
        let out = batches("a\nb\n", 2);
        assert_eq!(out, vec![vec!["a", "b"]]);
        assert!(batches("", 3).is_empty());
        assert!(batches("\n \n", 3).is_empty());
    }

    #[test]
    fn test_zero_batch_size() {
        let err = LineBatcher::from_reader(Cursor::new(Vec::new()), "mem", 0).err();
        assert!(matches!(err, Some(DatasetError::InvalidConfig(_))));
    }

    #[test]
    fn test_error_is_yielded_once() {
        let bytes = b"ok\n\xff\xfe\nnever\n".to_vec();
        let mut batcher = LineBatcher::from_reader(Cursor::new(bytes), "mem", 1).unwrap();

        assert_eq!(batcher.next().unwrap().unwrap(), vec!["ok"]);
        assert!(matches!(batcher.next(), Some(Err(DatasetError::Io { .. }))));
        assert!(batcher.next().is_none());
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = LineBatcher::open(dir.path().join("nope.txt"), 4).err();
        assert!(matches!(err, Some(DatasetError::NotFound { .. })));
    }
}
