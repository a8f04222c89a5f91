//! Streaming decoder for the LZ4 frame format.
//!
//! A frame is a header followed by length-prefixed blocks, an end marker and
//! an optional content checksum:
//!
//! ```text
//! [magic][FLG][BD][content size?][dict id?][HC] [block]* [0u32] [XXH32?]
//! ```
//!
//! [`FrameDecoder`] pulls blocks from any [`Read`](std::io::Read) source on
//! demand and exposes the decompressed bytes through `Read` and `BufRead`.
//! Only independent-block frames of version 1 are supported.
//!
//! # Example
//!
//! ```
//! use lzframe_stream::{DecoderConfig, FrameDecoder};
//! use std::io::{Cursor, Read};
//!
//! let frame = [0x04, 0x22, 0x4D, 0x18, 0x60, 0x40, 0x82, 0, 0, 0, 0];
//! let mut decoder = FrameDecoder::with_config(Cursor::new(frame), DecoderConfig::STRICT).unwrap();
//! assert_eq!(decoder.read(&mut [0u8; 16]).unwrap(), 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod decoder;
pub mod fetch;
pub mod header;

pub use config::DecoderConfig;
pub use decoder::FrameDecoder;
pub use fetch::{BlockFetcher, Fetched, decompress_growing};
pub use header::{BlockMaxSize, FrameFlags, FrameHeader, LZ4_FRAME_MAGIC, ReservedBits};
pub use lzframe_core::error::{FrameError, Result};

use std::io::Read;

/// Decode a whole frame into memory.
pub fn decode_all<R: Read>(source: R) -> Result<Vec<u8>> {
    decode_all_with_config(source, DecoderConfig::default())
}

/// Decode a whole frame into memory with the given configuration.
pub fn decode_all_with_config<R: Read>(source: R, config: DecoderConfig) -> Result<Vec<u8>> {
    let mut decoder = FrameDecoder::with_config(source, config)?;
    let mut output = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = decoder.read_frame(&mut buf)?;
        if n == 0 {
            break;
        }
        output.extend_from_slice(&buf[..n]);
    }
    Ok(output)
}
