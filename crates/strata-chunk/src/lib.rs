//! Content-defined chunking for large binary payloads.
//!
//! Large model weight files are split into variable-size chunks whose
//! boundaries are chosen by FastCDC's rolling function over the byte stream.
//! Because boundaries depend on content rather than offsets, a local edit to
//! the source buffer perturbs only nearby chunk boundaries — the rest of the
//! chunks keep their digests, which is what makes dedup effective across
//! near-identical model versions.
//!
//! [`split`] produces an ordered sequence of chunks; [`join`] concatenates
//! chunk bytes in order. `join(split(b)) == b` for every buffer `b`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Chunk size thresholds, in bytes.
///
/// The defaults match the chunking parameters the repositories this engine
/// reads were written with: 4 KiB minimum, 32 KiB average, 256 KiB maximum.
/// Changing them changes every chunk digest, so they are part of a
/// repository's configuration, not a per-call choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Minimum chunk size. The final chunk of a buffer may be shorter.
    pub min_size: u32,
    /// Target average chunk size.
    pub average_size: u32,
    /// Maximum chunk size.
    pub max_size: u32,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            min_size: 4 * 1024,
            average_size: 32 * 1024,
            max_size: 256 * 1024,
        }
    }
}

impl ChunkerConfig {
    /// Validate the thresholds: `min <= average <= max`, with each threshold
    /// inside the window the FastCDC rolling function accepts (min in
    /// 64..=64 MiB, average in 256..=256 MiB, max in 1024..=1 GiB). A
    /// config outside these windows would make the chunker constructor
    /// panic, so it is rejected here instead.
    pub fn validate(&self) -> Result<(), ChunkError> {
        const MIB: u32 = 1024 * 1024;
        if self.min_size < 64
            || self.min_size > 64 * MIB
            || self.average_size < 256
            || self.average_size > 256 * MIB
            || self.max_size < 1024
            || self.max_size > 1024 * MIB
            || self.average_size < self.min_size
            || self.max_size < self.average_size
        {
            return Err(ChunkError::InvalidConfig {
                min: self.min_size,
                average: self.average_size,
                max: self.max_size,
            });
        }
        Ok(())
    }
}

/// The location of one chunk within the source buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkSpan {
    /// Byte offset of the chunk in the source buffer.
    pub offset: usize,
    /// Length of the chunk in bytes.
    pub length: usize,
}

impl ChunkSpan {
    /// The chunk's bytes within `source`.
    pub fn slice<'a>(&self, source: &'a [u8]) -> &'a [u8] {
        &source[self.offset..self.offset + self.length]
    }
}

/// Errors from chunking operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    /// The configured thresholds are not ordered `min <= average <= max`,
    /// or fall outside the window the rolling function accepts.
    #[error("invalid chunker config: min={min} average={average} max={max}")]
    InvalidConfig { min: u32, average: u32, max: u32 },
}

/// Split a buffer into content-defined chunks.
///
/// Returns the ordered chunk spans covering `data` exactly, with no gaps or
/// overlaps. An empty buffer produces no chunks.
pub fn split(data: &[u8], config: &ChunkerConfig) -> Result<Vec<ChunkSpan>, ChunkError> {
    config.validate()?;
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let chunker = fastcdc::v2020::FastCDC::new(
        data,
        config.min_size,
        config.average_size,
        config.max_size,
    );
    Ok(chunker
        .map(|chunk| ChunkSpan {
            offset: chunk.offset,
            length: chunk.length,
        })
        .collect())
}

/// Concatenate chunk byte sequences in order.
///
/// The exact inverse of [`split`] when given the chunks in the order they
/// were produced; chunk order is the reconstruction invariant.
pub fn join<I, B>(chunks: I) -> Vec<u8>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut out = Vec::new();
    for chunk in chunks {
        out.extend_from_slice(chunk.as_ref());
    }
    out
}
