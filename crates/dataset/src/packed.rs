//! Fixed-shape tensor form of an encoding.

use crate::error::{DatasetError, Result};
use mlmprep_tokenizer::Encoding;
use std::io::Write;

/// Number of channels in a packed example.
pub const CHANNELS: usize = 4;

/// Channel order inside a packed example.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Ids = 0,
    SpecialTokensMask = 1,
    AttentionMask = 2,
    TypeIds = 3,
}

/// A `4 × seq_len` block of `u32`, stored channel-major:
/// ids, special-token mask, attention mask, type ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedTensor {
    data: Vec<u32>,
    seq_len: usize,
}

impl PackedTensor {
    /// Pack an encoding whose length is exactly `seq_len`.
    pub fn from_encoding(encoding: &Encoding, seq_len: usize) -> Result<Self> {
        if encoding.len() != seq_len {
            return Err(DatasetError::InvalidConfig(format!(
                "encoding has length {} but the dataset sequence length is {}",
                encoding.len(),
                seq_len
            )));
        }

        let mut data = Vec::with_capacity(CHANNELS * seq_len);
        data.extend_from_slice(&encoding.ids);
        data.extend_from_slice(&encoding.special_tokens_mask);
        data.extend_from_slice(&encoding.attention_mask);
        data.extend_from_slice(&encoding.type_ids);
        Ok(Self { data, seq_len })
    }

    /// Decode one record of little-endian `u32` values.
    pub(crate) fn from_le_bytes(bytes: &[u8], seq_len: usize) -> Self {
        let data = bytes
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Self { data, seq_len }
    }

    /// Size of one record on disk.
    pub fn byte_len(seq_len: usize) -> usize {
        CHANNELS * seq_len * std::mem::size_of::<u32>()
    }

    /// Append this tensor as little-endian `u32` values.
    pub fn write_le<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for value in &self.data {
            writer.write_all(&value.to_le_bytes())?;
        }
        Ok(())
    }

    /// Tensor shape as `(channels, seq_len)`.
    pub fn shape(&self) -> (usize, usize) {
        (CHANNELS, self.seq_len)
    }

    /// One channel as a row of `seq_len` values.
    pub fn channel(&self, channel: Channel) -> &[u32] {
        let start = channel as usize * self.seq_len;
        &self.data[start..start + self.seq_len]
    }

    pub fn ids(&self) -> &[u32] {
        self.channel(Channel::Ids)
    }

    pub fn special_tokens_mask(&self) -> &[u32] {
        self.channel(Channel::SpecialTokensMask)
    }

    pub fn attention_mask(&self) -> &[u32] {
        self.channel(Channel::AttentionMask)
    }

    pub fn type_ids(&self) -> &[u32] {
        self.channel(Channel::TypeIds)
    }

    /// All values, channel-major.
    pub fn as_slice(&self) -> &[u32] {
        &self.data
    }
}
