//! LZ4 block compression/decompression.
//!
//! LZ4 block format:
//! - Sequences of (token, [literal_length_ext], literals, offset, [match_length_ext])
//! - Token: 4-bit literal length + 4-bit match length
//! - If literal length = 15, additional bytes follow (add 255 until byte < 255)
//! - Literals: raw bytes
//! - Offset: 2 bytes little-endian (match offset, 1-65535)
//! - If match length = 15, additional bytes follow (add 255 until byte < 255)
//! - Match length is +4 (minimum match = 4)
//! - The last sequence carries literals only
//!
//! The encoder keeps the last 5 bytes as literals and never starts a match in
//! the last 12 bytes, which reference decoders require.

use lzframe_core::error::{CodecError, CodecResult};
use lzframe_core::traits::BlockCodec;

/// Minimum match length for LZ4.
const MIN_MATCH: usize = 4;

/// Maximum match offset (16-bit).
const MAX_OFFSET: usize = 65535;

/// Trailing bytes that must be emitted as literals.
const LAST_LITERALS: usize = 5;

/// No match may start within this many bytes of the end.
const MF_LIMIT: usize = 12;

/// Inputs shorter than this are emitted as a single literal run.
const MIN_INPUT_FOR_MATCH: usize = MF_LIMIT + 1;

/// Hash table size (must be power of 2).
const HASH_SIZE: usize = 1 << 14; // 16K entries

/// Maximum compressed size of an `input_len`-byte block.
pub fn compress_bound(input_len: usize) -> usize {
    input_len + input_len / 255 + 16
}

/// Compress data using LZ4 block format.
///
/// An empty input produces the one-byte block `[0x00]`.
pub fn compress_block(input: &[u8]) -> CodecResult<Vec<u8>> {
    let mut output = Vec::with_capacity(compress_bound(input.len()));
    let mut encoder = BlockEncoder::new(input);
    encoder.encode(&mut output);
    Ok(output)
}

/// Decompress LZ4 block data whose decompressed size is unknown.
///
/// Fails with [`CodecError::OutputOverflow`] as soon as the output would
/// exceed `capacity`.
pub fn decompress_block(input: &[u8], capacity: usize) -> CodecResult<Vec<u8>> {
    let mut output = Vec::with_capacity(capacity.min(input.len().saturating_mul(4)));
    let mut decoder = BlockDecoder::new(input);
    decoder.decode(&mut output, capacity)?;
    Ok(output)
}

/// Decompress LZ4 block data into a buffer of exactly the decompressed size.
pub fn decompress_block_known_size(input: &[u8], output: &mut [u8]) -> CodecResult<()> {
    let expected = output.len();
    let decoded = match decompress_block(input, expected) {
        Ok(decoded) => decoded,
        Err(CodecError::OutputOverflow { .. }) => {
            return Err(CodecError::SizeExceeded { expected });
        }
        Err(e) => return Err(e),
    };

    if decoded.len() != expected {
        return Err(CodecError::SizeMismatch {
            expected,
            actual: decoded.len(),
        });
    }

    output.copy_from_slice(&decoded);
    Ok(())
}

/// The LZ4 block codec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lz4BlockCodec;

impl BlockCodec for Lz4BlockCodec {
    fn compress(&self, input: &[u8]) -> CodecResult<Vec<u8>> {
        compress_block(input)
    }

    fn compress_bound(&self, input_len: usize) -> usize {
        compress_bound(input_len)
    }

    fn decompress_known_size(&self, input: &[u8], output: &mut [u8]) -> CodecResult<()> {
        decompress_block_known_size(input, output)
    }

    fn decompress_unknown_size(&self, input: &[u8], capacity: usize) -> CodecResult<Vec<u8>> {
        decompress_block(input, capacity)
    }
}

/// LZ4 block encoder.
struct BlockEncoder<'a> {
    input: &'a [u8],
    /// Position + 1 of the last occurrence of each hash (0 = empty).
    hash_table: Vec<u32>,
}

impl<'a> BlockEncoder<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            hash_table: vec![0; HASH_SIZE],
        }
    }

    /// Compute hash for 4 bytes.
    fn hash(data: u32) -> usize {
        // Knuth multiplicative hash
        ((data.wrapping_mul(2654435761)) >> 18) as usize & (HASH_SIZE - 1)
    }

    /// Read 4 bytes as u32 (little-endian).
    fn read_u32(data: &[u8], pos: usize) -> u32 {
        u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
    }

    /// Encode the input data.
    fn encode(&mut self, output: &mut Vec<u8>) {
        let input = self.input;
        let len = input.len();
        let mut anchor = 0; // Start of current literal run

        if len >= MIN_INPUT_FOR_MATCH {
            let last_match_start = len - MF_LIMIT;
            let match_end_limit = len - LAST_LITERALS;
            let mut pos = 0;

            while pos <= last_match_start {
                let cur_u32 = Self::read_u32(input, pos);
                let h = Self::hash(cur_u32);
                let candidate = self.hash_table[h] as usize;
                self.hash_table[h] = pos as u32 + 1;

                if candidate > 0 {
                    let match_pos = candidate - 1;
                    let offset = pos - match_pos;

                    if offset <= MAX_OFFSET && Self::read_u32(input, match_pos) == cur_u32 {
                        let mut match_len = MIN_MATCH;
                        while pos + match_len < match_end_limit
                            && input[match_pos + match_len] == input[pos + match_len]
                        {
                            match_len += 1;
                        }

                        self.emit_sequence(output, anchor, pos - anchor, offset, match_len);

                        pos += match_len;
                        anchor = pos;
                        continue;
                    }
                }

                pos += 1;
            }
        }

        self.emit_last_literals(output, anchor, len - anchor);
    }

    /// Write a length extension (bytes of 255 followed by the remainder).
    fn emit_length_ext(output: &mut Vec<u8>, mut remaining: usize) {
        while remaining >= 255 {
            output.push(255);
            remaining -= 255;
        }
        output.push(remaining as u8);
    }

    /// Emit literals followed by a match reference.
    fn emit_sequence(
        &self,
        output: &mut Vec<u8>,
        literal_start: usize,
        literal_len: usize,
        offset: usize,
        match_len: usize,
    ) {
        let ml = match_len - MIN_MATCH;
        let lit_token = literal_len.min(15);
        let match_token = ml.min(15);
        output.push(((lit_token << 4) | match_token) as u8);

        if literal_len >= 15 {
            Self::emit_length_ext(output, literal_len - 15);
        }

        output.extend_from_slice(&self.input[literal_start..literal_start + literal_len]);

        // Offset: 2 bytes little-endian
        output.extend_from_slice(&(offset as u16).to_le_bytes());

        if ml >= 15 {
            Self::emit_length_ext(output, ml - 15);
        }
    }

    /// Emit the last literals (no match at the end).
    fn emit_last_literals(&self, output: &mut Vec<u8>, literal_start: usize, literal_len: usize) {
        let lit_token = literal_len.min(15);
        output.push((lit_token << 4) as u8);

        if literal_len >= 15 {
            Self::emit_length_ext(output, literal_len - 15);
        }

        output.extend_from_slice(&self.input[literal_start..literal_start + literal_len]);
    }
}

/// LZ4 block decoder.
struct BlockDecoder<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> BlockDecoder<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Decode the block into output, never growing it past `capacity`.
    fn decode(&mut self, output: &mut Vec<u8>, capacity: usize) -> CodecResult<()> {
        if self.input.is_empty() {
            return Err(CodecError::corrupt(0, "empty block"));
        }

        while self.pos < self.input.len() {
            let token = self.read_byte()?;
            let literal_len = self.read_length((token >> 4) as usize)?;
            let match_len_base = (token & 0x0F) as usize;

            if literal_len > self.input.len() - self.pos {
                return Err(CodecError::corrupt(self.pos, "truncated literals"));
            }
            if literal_len > capacity - output.len() {
                return Err(CodecError::OutputOverflow { capacity });
            }

            output.extend_from_slice(&self.input[self.pos..self.pos + literal_len]);
            self.pos += literal_len;

            // Last sequence carries literals only
            if self.pos >= self.input.len() {
                break;
            }

            let offset = self.read_u16_le()? as usize;
            if offset == 0 {
                return Err(CodecError::corrupt(self.pos, "zero offset"));
            }
            if offset > output.len() {
                return Err(CodecError::corrupt(self.pos, "offset exceeds output"));
            }

            let match_len = self
                .read_length(match_len_base)?
                .checked_add(MIN_MATCH)
                .ok_or_else(|| CodecError::corrupt(self.pos, "match length overflow"))?;
            if match_len > capacity - output.len() {
                return Err(CodecError::OutputOverflow { capacity });
            }

            let start = output.len() - offset;
            if offset >= match_len {
                output.extend_from_within(start..start + match_len);
            } else {
                // Overlapping copy repeats the last `offset` bytes
                for i in 0..match_len {
                    let byte = output[start + (i % offset)];
                    output.push(byte);
                }
            }
        }

        Ok(())
    }

    fn read_byte(&mut self) -> CodecResult<u8> {
        if self.pos >= self.input.len() {
            return Err(CodecError::corrupt(self.pos, "unexpected end of block"));
        }
        let b = self.input[self.pos];
        self.pos += 1;
        Ok(b)
    }

    fn read_u16_le(&mut self) -> CodecResult<u16> {
        if self.pos + 2 > self.input.len() {
            return Err(CodecError::corrupt(self.pos, "truncated match offset"));
        }
        let value = u16::from_le_bytes([self.input[self.pos], self.input[self.pos + 1]]);
        self.pos += 2;
        Ok(value)
    }

    fn read_length(&mut self, base: usize) -> CodecResult<usize> {
        let mut len = base;
        if base == 15 {
            loop {
                let b = self.read_byte()? as usize;
                len = len
                    .checked_add(b)
                    .ok_or_else(|| CodecError::corrupt(self.pos, "length overflow"))?;
                if b != 255 {
                    break;
                }
            }
        }
        Ok(len)
    }
}
