//! Block fetching.
//!
//! Each call to [`BlockFetcher::next_block`] consumes one length-prefixed
//! block from the source, verifies its checksum if the frame carries one,
//! and hands back the decoded bytes as a fresh buffer.

use crate::config::DecoderConfig;
use crate::header::FrameHeader;
use lzframe_core::error::{FrameError, Result};
use lzframe_core::traits::BlockCodec;
use std::io::{ErrorKind, Read};
use tracing::trace;
use xxhash_rust::xxh32::xxh32;

/// Bit 31 of a block length marks a stored (uncompressed) payload.
pub const UNCOMPRESSED_FLAG: u32 = 0x8000_0000;

/// Mask for the payload length of a block prefix.
pub const BLOCK_SIZE_MASK: u32 = 0x7FFF_FFFF;

/// Result of one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    /// Decoded bytes of the next block (may be empty).
    Block(Vec<u8>),
    /// The end marker, or a clean end of input at a block boundary.
    EndOfStream,
}

/// Reads and decodes blocks one at a time.
#[derive(Debug)]
pub struct BlockFetcher<C> {
    codec: C,
    block_checksum: bool,
    verify_block_checksums: bool,
    capacity_multiplier: usize,
    limit: usize,
    blocks_fetched: u64,
}

impl<C: BlockCodec> BlockFetcher<C> {
    /// Create a fetcher for the blocks of the frame described by `header`.
    pub fn new(codec: C, header: &FrameHeader, config: &DecoderConfig) -> Self {
        Self {
            codec,
            block_checksum: header.flags.block_checksum,
            verify_block_checksums: config.verify_block_checksums,
            capacity_multiplier: config.capacity_multiplier.max(1),
            limit: header.block_limit(config),
            blocks_fetched: 0,
        }
    }

    /// Number of data blocks fetched so far (end marker excluded).
    pub fn blocks_fetched(&self) -> u64 {
        self.blocks_fetched
    }

    /// Largest payload, compressed or decoded, a block may have.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// The codec used for compressed blocks.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Fetch the next block from `source`.
    pub fn next_block<R: Read>(&mut self, source: &mut R) -> Result<Fetched> {
        let mut prefix = [0u8; 4];
        let n = read_full(source, &mut prefix)?;
        if n == 0 {
            trace!("end of input at block boundary");
            return Ok(Fetched::EndOfStream);
        }
        if n < prefix.len() {
            return Err(FrameError::TruncatedBlockLength { bytes_read: n });
        }

        let raw_len = u32::from_le_bytes(prefix);
        if raw_len == 0 {
            trace!(blocks = self.blocks_fetched, "end marker");
            return Ok(Fetched::EndOfStream);
        }

        let stored = raw_len & UNCOMPRESSED_FLAG != 0;
        let size = (raw_len & BLOCK_SIZE_MASK) as usize;
        if size > self.limit {
            return Err(FrameError::BlockTooLarge {
                size,
                max: self.limit,
            });
        }

        let mut payload = Vec::with_capacity(size);
        source.by_ref().take(size as u64).read_to_end(&mut payload)?;
        if payload.len() < size {
            return Err(FrameError::TruncatedBlockData {
                expected: size,
                got: payload.len(),
            });
        }

        let block_index = self.blocks_fetched;
        if self.block_checksum {
            let found = read_checksum(source, "block")?;
            if self.verify_block_checksums {
                let expected = xxh32(&payload, 0);
                if expected != found {
                    return Err(FrameError::BlockChecksumMismatch {
                        block_index,
                        expected,
                        found,
                    });
                }
            }
        }

        let block = if stored {
            payload
        } else {
            let hint = size.saturating_mul(self.capacity_multiplier);
            decompress_growing(&self.codec, &payload, hint, self.limit)?
        };

        self.blocks_fetched += 1;
        trace!(
            index = block_index,
            compressed = size,
            decoded = block.len(),
            stored,
            "fetched block"
        );
        Ok(Fetched::Block(block))
    }
}

/// Decompress `input` with a capacity that starts at `hint` and doubles on
/// overflow, never exceeding `max`.
pub fn decompress_growing<C: BlockCodec>(
    codec: &C,
    input: &[u8],
    hint: usize,
    max: usize,
) -> Result<Vec<u8>> {
    let max = max.max(1);
    let mut capacity = hint.clamp(1, max);
    loop {
        match codec.decompress_unknown_size(input, capacity) {
            Ok(output) => return Ok(output),
            Err(e) if e.is_overflow() && capacity < max => {
                let next = capacity.saturating_mul(2).min(max);
                trace!(from = capacity, to = next, "growing block buffer");
                capacity = next;
            }
            Err(e) => return Err(FrameError::block_decode(input.len(), e)),
        }
    }
}

/// Read a 4-byte little-endian checksum field.
pub(crate) fn read_checksum<R: Read>(source: &mut R, what: &'static str) -> Result<u32> {
    let mut buf = [0u8; 4];
    let n = read_full(source, &mut buf)?;
    if n < buf.len() {
        return Err(FrameError::TruncatedChecksum {
            what,
            bytes_read: n,
        });
    }
    Ok(u32::from_le_bytes(buf))
}

/// Fill as much of `buf` as the source allows, returning the count.
fn read_full<R: Read>(source: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
