//! Core traits for block compression.
//!
//! A frame is a sequence of independently compressed blocks. The frame
//! decoder never looks inside a block itself; it hands each payload to a
//! [`BlockCodec`], which is the seam between the container format and the
//! compression algorithm.

use crate::error::CodecResult;

/// A single-shot block compressor/decompressor.
pub trait BlockCodec {
    /// Compress one block.
    fn compress(&self, input: &[u8]) -> CodecResult<Vec<u8>>;

    /// Maximum compressed size for an input of `input_len` bytes.
    fn compress_bound(&self, input_len: usize) -> usize;

    /// Decompress a block whose decompressed length is known in advance.
    ///
    /// Fails unless `input` expands to exactly `output.len()` bytes.
    fn decompress_known_size(&self, input: &[u8], output: &mut [u8]) -> CodecResult<()>;

    /// Decompress a block whose decompressed length is unknown.
    ///
    /// Fails with [`CodecError::OutputOverflow`](crate::error::CodecError::OutputOverflow)
    /// if the output would exceed `capacity`; nothing is ever written past
    /// it. On success the returned buffer has the true decompressed length.
    fn decompress_unknown_size(&self, input: &[u8], capacity: usize) -> CodecResult<Vec<u8>>;
}

impl<C: BlockCodec + ?Sized> BlockCodec for &C {
    fn compress(&self, input: &[u8]) -> CodecResult<Vec<u8>> {
        (**self).compress(input)
    }

    fn compress_bound(&self, input_len: usize) -> usize {
        (**self).compress_bound(input_len)
    }

    fn decompress_known_size(&self, input: &[u8], output: &mut [u8]) -> CodecResult<()> {
        (**self).decompress_known_size(input, output)
    }

    fn decompress_unknown_size(&self, input: &[u8], capacity: usize) -> CodecResult<Vec<u8>> {
        (**self).decompress_unknown_size(input, capacity)
    }
}

impl<C: BlockCodec + ?Sized> BlockCodec for Box<C> {
    fn compress(&self, input: &[u8]) -> CodecResult<Vec<u8>> {
        (**self).compress(input)
    }

    fn compress_bound(&self, input_len: usize) -> usize {
        (**self).compress_bound(input_len)
    }

    fn decompress_known_size(&self, input: &[u8], output: &mut [u8]) -> CodecResult<()> {
        (**self).decompress_known_size(input, output)
    }

    fn decompress_unknown_size(&self, input: &[u8], capacity: usize) -> CodecResult<Vec<u8>> {
        (**self).decompress_unknown_size(input, capacity)
    }
}
