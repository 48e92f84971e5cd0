//! Random-access dataset store.
//!
//! One file per split, named `<split>_<max_seq_length>_<max_vocab_size>.store`.
//! A 32-byte header is followed by fixed-stride records, so example `i` lives
//! at a computable offset and reads go straight to the memory map.
//!
//! | offset | size | field |
//! |---|---|---|
//! | 0 | 4 | magic `MLMS` |
//! | 4 | 4 | format version, u32 LE |
//! | 8 | 4 | max_seq_length, u32 LE |
//! | 12 | 4 | max_vocab_size, u32 LE |
//! | 16 | 8 | example count, u64 LE |
//! | 24 | 8 | reserved, zero |

use crate::error::{DatasetError, Result};
use crate::packed::PackedTensor;
use memmap2::Mmap;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const MAGIC: &[u8; 4] = b"MLMS";
const FORMAT_VERSION: u32 = 1;
/// Header size in bytes.
pub const HEADER_LEN: usize = 32;
const COUNT_OFFSET: u64 = 16;
const PARTIAL_SUFFIX: &str = ".partial";

/// Dataset split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Valid,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Valid => "valid",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "train" => Ok(Split::Train),
            "valid" => Ok(Split::Valid),
            other => Err(DatasetError::InvalidConfig(format!(
                "unknown split '{other}', expected 'train' or 'valid'"
            ))),
        }
    }
}

/// File name of the store for a split and key.
pub fn store_file_name(split: Split, max_seq_length: usize, max_vocab_size: usize) -> String {
    format!("{split}_{max_seq_length}_{max_vocab_size}.store")
}

/// Path of the store for a split and key inside `dir`.
pub fn store_path(dir: &Path, split: Split, max_seq_length: usize, max_vocab_size: usize) -> PathBuf {
    dir.join(store_file_name(split, max_seq_length, max_vocab_size))
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

fn to_u32(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| DatasetError::InvalidConfig(format!("{what} {value} does not fit in a u32")))
}

fn encode_header(max_seq_length: u32, max_vocab_size: u32, count: u64) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[0..4].copy_from_slice(MAGIC);
    header[4..8].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
    header[8..12].copy_from_slice(&max_seq_length.to_le_bytes());
    header[12..16].copy_from_slice(&max_vocab_size.to_le_bytes());
    header[16..24].copy_from_slice(&count.to_le_bytes());
    header
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(buf)
}

fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(buf)
}

/// Appends packed examples to `<final>.partial`.
///
/// Nothing appears under the final name until [`PendingStore::commit`].
/// Dropping either stage before that removes the partial file.
pub struct StoreWriter {
    writer: Option<BufWriter<File>>,
    partial: PathBuf,
    target: PathBuf,
    max_seq_length: usize,
    count: u64,
}

impl StoreWriter {
    /// Start a store at `path`, writing to its partial sibling.
    pub fn create(path: impl Into<PathBuf>, max_seq_length: usize, max_vocab_size: usize) -> Result<Self> {
        let target = path.into();
        let partial = partial_path(&target);
        let seq = to_u32(max_seq_length, "max_seq_length")?;
        let vocab = to_u32(max_vocab_size, "max_vocab_size")?;

        let file = File::create(&partial).map_err(|e| DatasetError::io(&partial, e))?;
        let mut store = Self {
            writer: Some(BufWriter::new(file)),
            partial,
            target,
            max_seq_length,
            count: 0,
        };
        let header = encode_header(seq, vocab, 0);
        let partial = store.partial.clone();
        store
            .writer()?
            .write_all(&header)
            .map_err(|e| DatasetError::io(&partial, e))?;
        Ok(store)
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>> {
        match self.writer.as_mut() {
            Some(writer) => Ok(writer),
            None => Err(DatasetError::io(
                &self.partial,
                std::io::Error::new(std::io::ErrorKind::Other, "store writer already closed"),
            )),
        }
    }

    /// Append one example.
    pub fn append(&mut self, tensor: &PackedTensor) -> Result<()> {
        if tensor.shape().1 != self.max_seq_length {
            return Err(DatasetError::InvalidConfig(format!(
                "tensor sequence length {} does not match store sequence length {}",
                tensor.shape().1,
                self.max_seq_length
            )));
        }
        let partial = self.partial.clone();
        tensor
            .write_le(self.writer()?)
            .map_err(|e| DatasetError::io(&partial, e))?;
        self.count += 1;
        Ok(())
    }

    /// Push buffered examples to the file.
    pub fn flush(&mut self) -> Result<()> {
        let partial = self.partial.clone();
        self.writer()?
            .flush()
            .map_err(|e| DatasetError::io(&partial, e))
    }

    /// Number of examples appended so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Final path this store will be committed to.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Patch the example count into the header and sync the partial file.
    pub fn finish(mut self) -> Result<PendingStore> {
        let partial = self.partial.clone();
        let io_err = |e| DatasetError::io(&partial, e);

        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => return Err(io_err(std::io::Error::new(std::io::ErrorKind::Other, "store writer already closed"))),
        };
        let mut file = writer.into_inner().map_err(|e| io_err(e.into_error()))?;
        file.seek(SeekFrom::Start(COUNT_OFFSET)).map_err(io_err)?;
        file.write_all(&self.count.to_le_bytes()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;

        debug!(path = %self.partial.display(), count = self.count, "finished partial store");

        Ok(PendingStore {
            partial: std::mem::take(&mut self.partial),
            target: std::mem::take(&mut self.target),
            count: self.count,
            committed: false,
        })
    }
}

impl Drop for StoreWriter {
    fn drop(&mut self) {
        if self.partial.as_os_str().is_empty() {
            return;
        }
        self.writer.take();
        let _ = std::fs::remove_file(&self.partial);
    }
}

/// A complete store still under its partial name.
pub struct PendingStore {
    partial: PathBuf,
    target: PathBuf,
    count: u64,
    committed: bool,
}

impl PendingStore {
    /// Number of examples in the store.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Final path of the store.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Atomically move the store to its final name.
    pub fn commit(mut self) -> Result<PathBuf> {
        std::fs::rename(&self.partial, &self.target)
            .map_err(|e| DatasetError::io(&self.target, e))?;
        self.committed = true;
        Ok(self.target.clone())
    }
}

impl Drop for PendingStore {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.partial);
        }
    }
}

/// Read-only, memory-mapped view of a store file.
pub struct Store {
    mmap: Mmap,
    path: PathBuf,
    max_seq_length: usize,
    max_vocab_size: usize,
    count: usize,
    visible: usize,
}

impl Store {
    /// Open the store for `split` keyed by sequence length and vocabulary size.
    pub fn open(
        dir: impl AsRef<Path>,
        split: Split,
        max_seq_length: usize,
        max_vocab_size: usize,
    ) -> Result<Self> {
        let path = store_path(dir.as_ref(), split, max_seq_length, max_vocab_size);
        Self::open_path(path, max_seq_length, max_vocab_size)
    }

    /// Open a store file directly, checking it against the expected key.
    pub fn open_path(
        path: impl Into<PathBuf>,
        max_seq_length: usize,
        max_vocab_size: usize,
    ) -> Result<Self> {
        let path = path.into();
        let file = File::open(&path).map_err(|e| DatasetError::io(&path, e))?;
        // SAFETY: store files are only written under a partial name and
        // renamed into place once complete, so a mapped file is never mutated.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| DatasetError::io(&path, e))?;

        let corrupt = |reason: String| DatasetError::Corrupt {
            path: path.clone(),
            reason,
        };

        if mmap.len() < HEADER_LEN {
            return Err(corrupt(format!(
                "file is {} bytes, shorter than the {HEADER_LEN}-byte header",
                mmap.len()
            )));
        }
        if &mmap[0..4] != MAGIC {
            return Err(corrupt("bad magic".to_string()));
        }
        let version = read_u32(&mmap, 4);
        if version != FORMAT_VERSION {
            return Err(corrupt(format!("unsupported format version {version}")));
        }
        let seq = read_u32(&mmap, 8) as usize;
        let vocab = read_u32(&mmap, 12) as usize;
        if seq != max_seq_length || vocab != max_vocab_size {
            return Err(corrupt(format!(
                "header key ({seq}, {vocab}) does not match requested ({max_seq_length}, {max_vocab_size})"
            )));
        }
        if seq == 0 {
            return Err(corrupt("sequence length is zero".to_string()));
        }

        let count = read_u64(&mmap, 16);
        let stride = PackedTensor::byte_len(seq) as u64;
        let expected = count
            .checked_mul(stride)
            .and_then(|body| body.checked_add(HEADER_LEN as u64));
        if expected != Some(mmap.len() as u64) {
            return Err(corrupt(format!(
                "file is {} bytes but the header declares {count} examples",
                mmap.len()
            )));
        }
        let count = usize::try_from(count)
            .map_err(|_| corrupt(format!("example count {count} does not fit in memory")))?;

        debug!(path = %path.display(), count, "opened store");

        Ok(Self {
            mmap,
            path,
            max_seq_length: seq,
            max_vocab_size: vocab,
            count,
            visible: count,
        })
    }

    /// Restrict the visible examples to a stable prefix of
    /// `max(1, floor(len * ratio))`. An empty store stays empty.
    pub fn with_subset(mut self, ratio: f64) -> Result<Self> {
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(DatasetError::InvalidConfig(format!(
                "subset ratio must be in (0, 1], got {ratio}"
            )));
        }
        self.visible = if self.count == 0 {
            0
        } else {
            ((self.count as f64 * ratio).floor() as usize).clamp(1, self.count)
        };
        Ok(self)
    }

    /// Number of visible examples.
    pub fn len(&self) -> usize {
        self.visible
    }

    pub fn is_empty(&self) -> bool {
        self.visible == 0
    }

    /// Number of examples in the file, ignoring any subset.
    pub fn total_len(&self) -> usize {
        self.count
    }

    /// Read example `index`.
    pub fn get(&self, index: usize) -> Result<PackedTensor> {
        if index >= self.visible {
            return Err(DatasetError::Index {
                index,
                len: self.visible,
            });
        }
        let stride = PackedTensor::byte_len(self.max_seq_length);
        let start = HEADER_LEN + index * stride;
        Ok(PackedTensor::from_le_bytes(
            &self.mmap[start..start + stride],
            self.max_seq_length,
        ))
    }

    /// Iterate the visible examples in order. Each call starts over.
    pub fn iter(&self) -> impl Iterator<Item = PackedTensor> + '_ {
        let stride = PackedTensor::byte_len(self.max_seq_length);
        let body = &self.mmap[HEADER_LEN..HEADER_LEN + self.visible * stride];
        body.chunks_exact(stride)
            .map(move |record| PackedTensor::from_le_bytes(record, self.max_seq_length))
    }

    pub fn max_seq_length(&self) -> usize {
        self.max_seq_length
    }

    pub fn max_vocab_size(&self) -> usize {
        self.max_vocab_size
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Remove a store file if present.
pub(crate) fn remove_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DatasetError::io(path, e)),
    }
}

/// Remove leftover partial files for a store path.
pub(crate) fn remove_partial(path: &Path) -> Result<()> {
    remove_if_exists(&partial_path(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlmprep_tokenizer::Encoding;

    fn tensor(first: u32, seq_len: usize) -> PackedTensor {
        let mut ids = vec![1; seq_len];
        ids[0] = first;
        let encoding = Encoding {
            ids,
            tokens: vec![String::new(); seq_len],
            special_tokens_mask: vec![1; seq_len],
            attention_mask: vec![0; seq_len],
            type_ids: vec![0; seq_len],
        };
        PackedTensor::from_encoding(&encoding, seq_len).unwrap()
    }

    fn write_store(dir: &Path, split: Split, n: u32) -> PathBuf {
        let path = store_path(dir, split, 4, 10);
        let mut writer = StoreWriter::create(&path, 4, 10).unwrap();
        for i in 0..n {
            writer.append(&tensor(100 + i, 4)).unwrap();
        }
        writer.finish().unwrap().commit().unwrap()
    }

    #[test]
    fn test_file_name() {
        assert_eq!(store_file_name(Split::Train, 12, 10), "train_12_10.store");
        assert_eq!(store_file_name(Split::Valid, 512, 30000), "valid_512_30000.store");
        assert_eq!("valid".parse::<Split>().unwrap(), Split::Valid);
        assert!("test".parse::<Split>().is_err());
    }

    #[test]
    fn test_write_then_random_access() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_store(dir.path(), Split::Train, 3);

        assert_eq!(
            std::fs::metadata(&path).unwrap().len() as usize,
            HEADER_LEN + 3 * PackedTensor::byte_len(4)
        );

        let store = Store::open(dir.path(), Split::Train, 4, 10).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(2).unwrap().ids(), &[102, 1, 1, 1]);
        assert_eq!(store.get(0).unwrap().attention_mask(), &[0, 0, 0, 0]);
        assert!(matches!(
            store.get(3),
            Err(DatasetError::Index { index: 3, len: 3 })
        ));

        let first: Vec<u32> = store.iter().map(|t| t.ids()[0]).collect();
        let second: Vec<u32> = store.iter().map(|t| t.ids()[0]).collect();
        assert_eq!(first, vec![100, 101, 102]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_store() {
        let dir = tempfile::tempdir().unwrap();
        write_store(dir.path(), Split::Train, 1);
        assert!(matches!(
            Store::open(dir.path(), Split::Train, 8, 10),
            Err(DatasetError::NotFound { .. })
        ));
        assert!(matches!(
            Store::open(dir.path(), Split::Valid, 4, 10),
            Err(DatasetError::NotFound { .. })
        ));
    }

    #[test]
    fn test_uncommitted_writer_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(dir.path(), Split::Train, 4, 10);
        {
            let mut writer = StoreWriter::create(&path, 4, 10).unwrap();
            writer.append(&tensor(7, 4)).unwrap();
            writer.flush().unwrap();
            assert!(partial_path(&path).exists());
        }
        {
            let writer = StoreWriter::create(&path, 4, 10).unwrap();
            let pending = writer.finish().unwrap();
            assert_eq!(pending.count(), 0);
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_corrupt_stores() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_store(dir.path(), Split::Train, 2);
        let bytes = std::fs::read(&path).unwrap();

        let mut bad_magic = bytes.clone();
        bad_magic[0] = b'X';
        std::fs::write(&path, &bad_magic).unwrap();
        assert!(matches!(
            Store::open(dir.path(), Split::Train, 4, 10),
            Err(DatasetError::Corrupt { .. })
        ));

        std::fs::write(&path, &bytes[..bytes.len() - 4]).unwrap();
        assert!(matches!(
            Store::open(dir.path(), Split::Train, 4, 10),
            Err(DatasetError::Corrupt { .. })
        ));

        std::fs::write(&path, &bytes[..10]).unwrap();
        assert!(matches!(
            Store::open(dir.path(), Split::Train, 4, 10),
            Err(DatasetError::Corrupt { .. })
        ));

        // right bytes under the wrong key
        std::fs::write(&path, &bytes).unwrap();
        let renamed = store_path(dir.path(), Split::Train, 4, 11);
        std::fs::rename(&path, &renamed).unwrap();
        assert!(matches!(
            Store::open(dir.path(), Split::Train, 4, 11),
            Err(DatasetError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_subset() {
        let dir = tempfile::tempdir().unwrap();
        write_store(dir.path(), Split::Train, 10);

        let open = || Store::open(dir.path(), Split::Train, 4, 10).unwrap();
        assert_eq!(open().with_subset(0.35).unwrap().len(), 3);
        assert_eq!(open().with_subset(0.01).unwrap().len(), 1);
        assert_eq!(open().with_subset(1.0).unwrap().len(), 10);

        let subset = open().with_subset(0.2).unwrap();
        assert_eq!(subset.total_len(), 10);
        assert_eq!(subset.get(1).unwrap().ids()[0], 101);
        assert!(subset.get(2).is_err());
        assert_eq!(subset.iter().count(), 2);

        for bad in [0.0, -0.5, 1.5, f64::NAN] {
            assert!(matches!(
                open().with_subset(bad),
                Err(DatasetError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_empty_store_subset() {
        let dir = tempfile::tempdir().unwrap();
        write_store(dir.path(), Split::Valid, 0);

        let store = Store::open(dir.path(), Split::Valid, 4, 10)
            .unwrap()
            .with_subset(0.5)
            .unwrap();
        assert!(store.is_empty());
        assert_eq!(store.iter().count(), 0);
    }
}
