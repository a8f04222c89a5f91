//! Unframed single-block adapters.
//!
//! [`BlockWriter`] turns every `write` call into one raw LZ4 block and
//! [`BlockReader`] decompresses a whole source as one raw block. Neither
//! carries a frame header, length prefix or checksum; use the frame decoder
//! for anything produced by the reference `lz4` tool.

use crate::block::{compress_block, decompress_block};
use std::io::{self, Read, Write};

/// Default decompressed size limit for [`BlockReader`].
pub const DEFAULT_READER_LIMIT: usize = 64 * 1024 * 1024;

/// Writes each buffer it is given as one compressed block.
#[derive(Debug)]
pub struct BlockWriter<W: Write> {
    writer: W,
}

impl<W: Write> BlockWriter<W> {
    /// Create a new block writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Get the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Write for BlockWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let compressed =
            compress_block(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.writer.write_all(&compressed)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Reads a source holding exactly one compressed block.
///
/// The source is buffered completely on the first read, since a raw block
/// carries no length information. Input read before a source error is kept,
/// so a retried read resumes where the source left off.
#[derive(Debug)]
pub struct BlockReader<R: Read> {
    reader: R,
    limit: usize,
    input: Vec<u8>,
    decoded: Option<Vec<u8>>,
    pos: usize,
}

impl<R: Read> BlockReader<R> {
    /// Create a new block reader with the default output limit.
    pub fn new(reader: R) -> Self {
        Self::with_limit(reader, DEFAULT_READER_LIMIT)
    }

    /// Create a new block reader refusing output larger than `limit` bytes.
    pub fn with_limit(reader: R, limit: usize) -> Self {
        Self {
            reader,
            limit,
            input: Vec::new(),
            decoded: None,
            pos: 0,
        }
    }

    fn decoded(&mut self) -> io::Result<&[u8]> {
        if self.decoded.is_none() {
            self.reader.read_to_end(&mut self.input)?;
            let output = decompress_block(&self.input, self.limit)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            self.input = Vec::new();
            self.decoded = Some(output);
        }
        Ok(self.decoded.as_deref().unwrap_or_default())
    }
}

impl<R: Read> Read for BlockReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let pos = self.pos;
        let data = self.decoded()?;
        let n = buf.len().min(data.len() - pos);
        buf[..n].copy_from_slice(&data[pos..pos + n]);
        self.pos += n;
        Ok(n)
    }
}
