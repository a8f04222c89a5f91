//! # lzframe core
//!
//! Core components shared by the lzframe crates:
//!
//! - [`bitstream`]: MSB-first bit field reader for packed headers
//! - [`traits`]: the [`BlockCodec`] seam between frame and block layers
//! - [`error`]: frame and codec error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Driver                                              │
//! │     lzframe CLI                                         │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Container                                           │
//! │     Frame header parser, block fetcher, stream decoder  │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Codec                                               │
//! │     LZ4 block compress / decompress                     │
//! ├─────────────────────────────────────────────────────────┤
//! │ L0: Core (this crate)                                   │
//! │     BitFieldReader, BlockCodec, FrameError              │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use lzframe_core::bitstream::BitFieldReader;
//! use std::io::Cursor;
//!
//! let mut reader = BitFieldReader::new(Cursor::new([0x64, 0x40]));
//! let fields = reader.read_fields(&[2, 1, 1]).unwrap();
//! assert_eq!(fields, vec![1, 1, 0]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod error;
pub mod traits;

// Re-exports for convenience
pub use bitstream::BitFieldReader;
pub use error::{CodecError, CodecResult, FrameError, Result};
pub use traits::BlockCodec;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::BitFieldReader;
    pub use crate::error::{CodecError, CodecResult, FrameError, Result};
    pub use crate::traits::BlockCodec;
}
