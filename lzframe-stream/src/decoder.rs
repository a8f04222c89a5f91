//! Pull-based frame decoder.
//!
//! [`FrameDecoder`] parses and validates the header when it is created,
//! then decodes one block at a time as the caller reads. Only the current
//! block is held in memory.

use crate::config::DecoderConfig;
use crate::fetch::{BlockFetcher, Fetched, read_checksum};
use crate::header::FrameHeader;
use lzframe_block::Lz4BlockCodec;
use lzframe_core::error::{FrameError, Result};
use lzframe_core::traits::BlockCodec;
use std::fmt;
use std::io::{self, BufRead, Read};
use tracing::debug;
use xxhash_rust::xxh32::Xxh32;

/// Decoder lifecycle. There is no way back from a terminal state.
enum State {
    /// Blocks remain to be read.
    Active,
    /// End marker seen and the trailer verified.
    Finished,
    /// A fatal error occurred; it is reported again on every read.
    Failed(FrameError),
}

/// Streaming LZ4 frame decoder.
///
/// # Example
///
/// ```
/// use lzframe_stream::FrameDecoder;
/// use std::io::{Cursor, Read};
///
/// // Empty frame: header (FLG 0x60, BD 0x40, HC 0x82) and end marker
/// let frame = [0x04, 0x22, 0x4D, 0x18, 0x60, 0x40, 0x82, 0, 0, 0, 0];
/// let mut decoder = FrameDecoder::new(Cursor::new(frame)).unwrap();
/// let mut out = Vec::new();
/// decoder.read_to_end(&mut out).unwrap();
/// assert!(out.is_empty());
/// assert!(decoder.is_finished());
/// ```
pub struct FrameDecoder<R, C = Lz4BlockCodec> {
    source: R,
    header: FrameHeader,
    config: DecoderConfig,
    fetcher: BlockFetcher<C>,
    block: Vec<u8>,
    pos: usize,
    hasher: Option<Xxh32>,
    produced: u64,
    state: State,
}

impl<R: Read> FrameDecoder<R> {
    /// Open a frame with the default configuration.
    pub fn new(source: R) -> Result<Self> {
        Self::with_config(source, DecoderConfig::default())
    }

    /// Open a frame with the given configuration.
    pub fn with_config(source: R, config: DecoderConfig) -> Result<Self> {
        Self::with_codec(source, Lz4BlockCodec, config)
    }
}

impl<R: Read, C: BlockCodec> FrameDecoder<R, C> {
    /// Open a frame decoding its blocks with `codec`.
    ///
    /// The header is parsed and validated and the first block is fetched
    /// before this returns.
    pub fn with_codec(mut source: R, codec: C, config: DecoderConfig) -> Result<Self> {
        let header = FrameHeader::read_from(&mut source)?;
        header.validate(&config)?;
        debug!(
            version = header.version,
            block_max_size = ?header.block_max_size(),
            block_checksum = header.flags.block_checksum,
            content_checksum = header.flags.content_checksum,
            content_size = ?header.content_size,
            dict_id = ?header.dict_id,
            "parsed frame header"
        );

        let fetcher = BlockFetcher::new(codec, &header, &config);
        let hasher = (header.flags.content_checksum && config.verify_content_checksum)
            .then(|| Xxh32::new(0));

        let mut decoder = Self {
            source,
            header,
            config,
            fetcher,
            block: Vec::new(),
            pos: 0,
            hasher,
            produced: 0,
            state: State::Active,
        };
        decoder.advance()?;
        Ok(decoder)
    }

    /// The parsed frame header.
    pub fn header(&self) -> &FrameHeader {
        &self.header
    }

    /// The configuration in effect.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Number of data blocks decoded so far.
    pub fn blocks_decoded(&self) -> u64 {
        self.fetcher.blocks_fetched()
    }

    /// Total decompressed bytes decoded so far.
    pub fn bytes_produced(&self) -> u64 {
        self.produced
    }

    /// Whether the end marker has been reached and the trailer verified.
    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Finished)
    }

    /// Whether the decoder has stopped on an error.
    pub fn is_failed(&self) -> bool {
        matches!(self.state, State::Failed(_))
    }

    /// Get a reference to the underlying source.
    pub fn get_ref(&self) -> &R {
        &self.source
    }

    /// Get a mutable reference to the underlying source.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.source
    }

    /// Consume the decoder and return the underlying source.
    ///
    /// After the frame finished, the source is positioned right after it.
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Read decoded bytes into `buf`, returning the count.
    ///
    /// `Ok(0)` means the frame has ended (or `buf` is empty). Fewer bytes
    /// than requested are returned at the end of each block.
    pub fn read_frame(&mut self, buf: &mut [u8]) -> Result<usize> {
        if let State::Failed(e) = &self.state {
            return Err(e.replay());
        }
        if buf.is_empty() {
            return Ok(0);
        }

        let available = self.fill()?;
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        Ok(n)
    }

    /// Remaining bytes of the current block, fetching the next if drained.
    fn fill(&mut self) -> Result<&[u8]> {
        match &self.state {
            State::Failed(e) => return Err(e.replay()),
            State::Finished => return Ok(&[]),
            State::Active => {}
        }

        if self.pos >= self.block.len() {
            if let Err(e) = self.advance() {
                let reported = e.replay();
                self.block = Vec::new();
                self.pos = 0;
                self.state = State::Failed(e);
                return Err(reported);
            }
        }
        Ok(&self.block[self.pos..])
    }

    /// Load the next non-empty block, or finish on end of stream.
    fn advance(&mut self) -> Result<()> {
        loop {
            match self.fetcher.next_block(&mut self.source)? {
                Fetched::Block(block) => {
                    if let Some(hasher) = &mut self.hasher {
                        hasher.update(&block);
                    }
                    self.produced += block.len() as u64;
                    self.block = block;
                    self.pos = 0;
                    if !self.block.is_empty() {
                        return Ok(());
                    }
                }
                Fetched::EndOfStream => {
                    self.block = Vec::new();
                    self.pos = 0;
                    self.finish()?;
                    self.state = State::Finished;
                    return Ok(());
                }
            }
        }
    }

    /// Verify the frame trailer and the declared content size.
    fn finish(&mut self) -> Result<()> {
        if self.header.flags.content_checksum {
            let found = read_checksum(&mut self.source, "content")?;
            if let Some(hasher) = &self.hasher {
                let expected = hasher.digest();
                if expected != found {
                    return Err(FrameError::ContentChecksumMismatch { expected, found });
                }
            }
        }

        if self.config.verify_content_size {
            if let Some(expected) = self.header.content_size {
                if expected != self.produced {
                    return Err(FrameError::ContentSizeMismatch {
                        expected,
                        actual: self.produced,
                    });
                }
            }
        }

        debug!(
            blocks = self.fetcher.blocks_fetched(),
            bytes = self.produced,
            "frame finished"
        );
        Ok(())
    }
}

impl<R: Read, C: BlockCodec> Read for FrameDecoder<R, C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_frame(buf).map_err(io::Error::from)
    }
}

impl<R: Read, C: BlockCodec> BufRead for FrameDecoder<R, C> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.fill().map_err(io::Error::from)
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.block.len());
    }
}

impl<R, C> fmt::Debug for FrameDecoder<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            State::Active => "active",
            State::Finished => "finished",
            State::Failed(_) => "failed",
        };
        f.debug_struct("FrameDecoder")
            .field("header", &self.header)
            .field("config", &self.config)
            .field("block_len", &self.block.len())
            .field("pos", &self.pos)
            .field("produced", &self.produced)
            .field("state", &state)
            .finish_non_exhaustive()
    }
}
