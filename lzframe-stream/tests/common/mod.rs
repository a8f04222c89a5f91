//! Frame construction helpers shared by the integration tests.

#![allow(dead_code)]

use lzframe_block::compress_block;
use std::io::{self, Read};
use xxhash_rust::xxh32::xxh32;

pub const FLG_VERSION_1: u8 = 0x40;
pub const FLG_INDEPENDENT: u8 = 0x20;
pub const FLG_BLOCK_CHECKSUM: u8 = 0x10;
pub const FLG_CONTENT_SIZE: u8 = 0x08;
pub const FLG_CONTENT_CHECKSUM: u8 = 0x04;
pub const FLG_DICT_ID: u8 = 0x01;

/// Builds LZ4 frames byte by byte.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    flg: u8,
    bd: u8,
    content_size: Option<u64>,
    dict_id: Option<u32>,
    corrupt_header_checksum: bool,
    blocks: Vec<Vec<u8>>,
    content: Vec<u8>,
    end_marker: bool,
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuilder {
    /// Version 1, independent blocks, 64 KB block size, no optional fields.
    pub fn new() -> Self {
        Self {
            flg: FLG_VERSION_1 | FLG_INDEPENDENT,
            bd: 0x40,
            content_size: None,
            dict_id: None,
            corrupt_header_checksum: false,
            blocks: Vec::new(),
            content: Vec::new(),
            end_marker: true,
        }
    }

    /// Replace the whole FLG byte.
    pub fn flg(mut self, flg: u8) -> Self {
        self.flg = flg;
        self
    }

    /// Replace the whole BD byte.
    pub fn bd(mut self, bd: u8) -> Self {
        self.bd = bd;
        self
    }

    pub fn block_max_code(mut self, code: u8) -> Self {
        self.bd = (self.bd & 0x8F) | ((code & 0x07) << 4);
        self
    }

    pub fn block_checksum(mut self) -> Self {
        self.flg |= FLG_BLOCK_CHECKSUM;
        self
    }

    pub fn content_checksum(mut self) -> Self {
        self.flg |= FLG_CONTENT_CHECKSUM;
        self
    }

    pub fn content_size(mut self, size: u64) -> Self {
        self.flg |= FLG_CONTENT_SIZE;
        self.content_size = Some(size);
        self
    }

    pub fn dict_id(mut self, id: u32) -> Self {
        self.flg |= FLG_DICT_ID;
        self.dict_id = Some(id);
        self
    }

    pub fn corrupt_header_checksum(mut self) -> Self {
        self.corrupt_header_checksum = true;
        self
    }

    pub fn without_end_marker(mut self) -> Self {
        self.end_marker = false;
        self
    }

    /// Append one LZ4-compressed block carrying `data`.
    pub fn data(mut self, data: &[u8]) -> Self {
        let payload = compress_block(data).expect("compress block");
        self.push_block(payload.len() as u32, payload);
        self.content.extend_from_slice(data);
        self
    }

    /// Append one stored (uncompressed) block.
    pub fn stored(mut self, data: &[u8]) -> Self {
        self.push_block(data.len() as u32 | 0x8000_0000, data.to_vec());
        self.content.extend_from_slice(data);
        self
    }

    /// Append a compressed block whose payload is given verbatim.
    pub fn raw_block(mut self, payload: &[u8], decoded: &[u8]) -> Self {
        self.push_block(payload.len() as u32, payload.to_vec());
        self.content.extend_from_slice(decoded);
        self
    }

    fn push_block(&mut self, prefix: u32, payload: Vec<u8>) {
        let mut block = prefix.to_le_bytes().to_vec();
        if self.flg & FLG_BLOCK_CHECKSUM != 0 {
            let sum = xxh32(&payload, 0);
            block.extend_from_slice(&payload);
            block.extend_from_slice(&sum.to_le_bytes());
        } else {
            block.extend_from_slice(&payload);
        }
        self.blocks.push(block);
    }

    /// Decompressed content of all blocks appended so far.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn header_bytes(&self) -> Vec<u8> {
        let mut desc = vec![self.flg, self.bd];
        if let Some(size) = self.content_size {
            desc.extend_from_slice(&size.to_le_bytes());
        }
        if let Some(id) = self.dict_id {
            desc.extend_from_slice(&id.to_le_bytes());
        }
        let mut hc = (xxh32(&desc, 0) >> 8) as u8;
        if self.corrupt_header_checksum {
            hc ^= 0x5A;
        }

        let mut out = vec![0x04, 0x22, 0x4D, 0x18];
        out.extend_from_slice(&desc);
        out.push(hc);
        out
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = self.header_bytes();
        for block in &self.blocks {
            out.extend_from_slice(block);
        }
        if self.end_marker {
            out.extend_from_slice(&[0, 0, 0, 0]);
            if self.flg & FLG_CONTENT_CHECKSUM != 0 {
                out.extend_from_slice(&xxh32(&self.content, 0).to_le_bytes());
            }
        }
        out
    }
}

pub fn hello_text() -> Vec<u8> {
    b"Hello world, this is quite something".repeat(10)
}

/// Deterministic, poorly compressible bytes.
pub fn noise(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed.wrapping_mul(2654435761).wrapping_add(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

/// Read everything using a fixed read buffer size.
pub fn read_in_chunks<R: Read>(reader: &mut R, chunk: usize) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut buf = vec![0u8; chunk];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            return Ok(out);
        }
        out.extend_from_slice(&buf[..n]);
    }
}

/// Serves `limit` bytes from `inner`, then fails every read.
pub struct FailingReader<R> {
    inner: R,
    remaining: usize,
}

impl<R: Read> FailingReader<R> {
    pub fn new(inner: R, limit: usize) -> Self {
        Self {
            inner,
            remaining: limit,
        }
    }
}

impl<R: Read> Read for FailingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "source closed"));
        }
        let max = buf.len().min(self.remaining);
        let n = self.inner.read(&mut buf[..max])?;
        self.remaining -= n;
        Ok(n)
    }
}

/// Interrupts every other read.
pub struct InterruptingReader<R> {
    inner: R,
    interrupt: bool,
}

impl<R: Read> InterruptingReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            interrupt: true,
        }
    }
}

impl<R: Read> Read for InterruptingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.interrupt = !self.interrupt;
        if !self.interrupt {
            return Err(io::Error::new(io::ErrorKind::Interrupted, "interrupted"));
        }
        self.inner.read(buf)
    }
}
