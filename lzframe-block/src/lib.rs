//! Pure Rust LZ4 block codec.
//!
//! LZ4 is a lossless compression algorithm focusing on compression and
//! decompression speed. This crate implements the raw block format only;
//! frames (headers, length prefixes, checksums) are handled by
//! `lzframe-stream`.
//!
//! # Features
//!
//! - Single-shot block compression with [`compress_bound`] sizing
//! - Decompression into a buffer of known size
//! - Decompression of unknown size bounded by a capacity
//! - [`Lz4BlockCodec`], the [`BlockCodec`](lzframe_core::BlockCodec) implementation
//! - Unframed [`BlockReader`] / [`BlockWriter`] adapters
//!
//! # Example
//!
//! ```
//! use lzframe_block::{compress_block, decompress_block};
//!
//! let data = b"Hello, World! Hello, World!";
//! let compressed = compress_block(data).unwrap();
//! let decompressed = decompress_block(&compressed, data.len() * 2).unwrap();
//! assert_eq!(decompressed, data);
//! ```

mod block;
pub mod io;

pub use block::{
    Lz4BlockCodec, compress_block, compress_bound, decompress_block, decompress_block_known_size,
};
pub use io::{BlockReader, BlockWriter};
