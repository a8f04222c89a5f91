//! Error types for lzframe operations.
//!
//! [`FrameError`] covers every way reading a frame can fail: bit-level
//! underflow, header format violations, block stream corruption, trailer
//! verification, and I/O errors from the underlying source. [`CodecError`]
//! is the narrower error reported by a block codec for a single block.

use std::io;
use thiserror::Error;

/// Errors reported by a block codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Decompressed output would not fit in the provided capacity.
    #[error("Output overflow: decompressed data exceeds capacity of {capacity} bytes")]
    OutputOverflow {
        /// Capacity that was provided.
        capacity: usize,
    },

    /// Malformed compressed input.
    #[error("Corrupt block at offset {offset}: {message}")]
    Corrupt {
        /// Offset into the compressed input where decoding failed.
        offset: usize,
        /// Description of the corruption.
        message: String,
    },

    /// Input did not expand to exactly the expected length.
    #[error("Size mismatch: expected {expected} decompressed bytes, produced {actual}")]
    SizeMismatch {
        /// Expected output length.
        expected: usize,
        /// Actual output length.
        actual: usize,
    },

    /// Input expands past the expected length.
    #[error("Size exceeded: decompressed data exceeds the expected {expected} bytes")]
    SizeExceeded {
        /// Expected output length.
        expected: usize,
    },
}

/// Result type for block codec operations.
pub type CodecResult<T> = std::result::Result<T, CodecError>;

impl CodecError {
    /// Create a corrupt block error.
    pub fn corrupt(offset: usize, message: impl Into<String>) -> Self {
        Self::Corrupt {
            offset,
            message: message.into(),
        }
    }

    /// Returns true if the error only signals insufficient capacity.
    pub fn is_overflow(&self) -> bool {
        matches!(self, Self::OutputOverflow { .. })
    }
}

/// The main error type for frame decoding.
#[derive(Debug, Error)]
pub enum FrameError {
    /// I/O error from the underlying source.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source ran out before all requested bits were available.
    #[error("Short read: requested {bits_requested} bits, only {bits_available} available")]
    ShortRead {
        /// Number of bits requested by the call.
        bits_requested: u64,
        /// Number of bits that could be read before exhaustion.
        bits_available: u64,
    },

    /// A bit field wider than 64 bits was requested.
    #[error("Unsupported bit field width: {width} (maximum is 64)")]
    UnsupportedWidth {
        /// The requested width.
        width: u32,
    },

    /// Frame magic number did not match.
    #[error("Bad magic number: expected {expected:#010x}, found {found:#010x}")]
    BadMagic {
        /// Expected magic value.
        expected: u32,
        /// Magic value found in the stream.
        found: u32,
    },

    /// Frame version is not 1.
    #[error("Unsupported frame version: {version}")]
    UnsupportedVersion {
        /// Version found in the header.
        version: u8,
    },

    /// The frame uses linked (block-dependent) blocks.
    #[error("Unsupported frame format: block independence flag is not set")]
    UnsupportedBlockDependence,

    /// Header fields carry values this decoder refuses.
    #[error("Malformed header: {message}")]
    MalformedHeader {
        /// Description of the problem.
        message: String,
    },

    /// The source ended inside the frame header.
    #[error("Truncated frame header after {bytes_read} bytes")]
    TruncatedHeader {
        /// Header bytes consumed before the source ran out.
        bytes_read: u64,
    },

    /// Header checksum byte did not match the descriptor.
    #[error("Header checksum mismatch: expected {expected:#04x}, found {found:#04x}")]
    HeaderChecksumMismatch {
        /// Checksum computed from the descriptor.
        expected: u8,
        /// Checksum stored in the header.
        found: u8,
    },

    /// The source ended inside a block length prefix.
    #[error("Truncated block length: only {bytes_read} of 4 bytes available")]
    TruncatedBlockLength {
        /// Bytes of the prefix that were read.
        bytes_read: usize,
    },

    /// The source ended inside a block payload.
    #[error("Truncated block data: expected {expected} bytes, got {got}")]
    TruncatedBlockData {
        /// Payload length announced by the prefix.
        expected: usize,
        /// Bytes actually available.
        got: usize,
    },

    /// A block length prefix exceeds the maximum block size.
    #[error("Block too large: {size} bytes exceeds maximum of {max}")]
    BlockTooLarge {
        /// Announced payload size.
        size: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// The block codec rejected a block.
    #[error("Failed to decode block of {compressed_len} compressed bytes: {source}")]
    BlockDecode {
        /// Length of the compressed block.
        compressed_len: usize,
        /// Codec-level cause.
        #[source]
        source: CodecError,
    },

    /// A block checksum did not match its payload.
    #[error("Block {block_index} checksum mismatch: expected {expected:#010x}, found {found:#010x}")]
    BlockChecksumMismatch {
        /// Zero-based index of the block in the frame.
        block_index: u64,
        /// Checksum computed from the payload.
        expected: u32,
        /// Checksum stored in the stream.
        found: u32,
    },

    /// The source ended inside a 4-byte checksum field.
    #[error("Truncated {what} checksum: only {bytes_read} of 4 bytes available")]
    TruncatedChecksum {
        /// Which checksum was being read ("block" or "content").
        what: &'static str,
        /// Bytes of the checksum that were read.
        bytes_read: usize,
    },

    /// The content checksum did not match the decoded data.
    #[error("Content checksum mismatch: expected {expected:#010x}, found {found:#010x}")]
    ContentChecksumMismatch {
        /// Checksum computed over the decoded content.
        expected: u32,
        /// Checksum stored in the trailer.
        found: u32,
    },

    /// Decoded byte count differs from the declared content size.
    #[error("Content size mismatch: header declares {expected} bytes, decoded {actual}")]
    ContentSizeMismatch {
        /// Size declared in the header.
        expected: u64,
        /// Bytes actually decoded.
        actual: u64,
    },
}

/// Result type alias for frame operations.
pub type Result<T> = std::result::Result<T, FrameError>;

impl FrameError {
    /// Create a malformed header error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedHeader {
            message: message.into(),
        }
    }

    /// Create a block decode error.
    pub fn block_decode(compressed_len: usize, source: CodecError) -> Self {
        Self::BlockDecode {
            compressed_len,
            source,
        }
    }

    /// Returns true for header format errors.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::BadMagic { .. }
                | Self::UnsupportedVersion { .. }
                | Self::UnsupportedBlockDependence
                | Self::MalformedHeader { .. }
                | Self::TruncatedHeader { .. }
                | Self::HeaderChecksumMismatch { .. }
        )
    }

    /// Returns true for errors in the block stream or trailer.
    pub fn is_block_error(&self) -> bool {
        matches!(
            self,
            Self::TruncatedBlockLength { .. }
                | Self::TruncatedBlockData { .. }
                | Self::BlockTooLarge { .. }
                | Self::BlockDecode { .. }
                | Self::BlockChecksumMismatch { .. }
                | Self::TruncatedChecksum { .. }
                | Self::ContentChecksumMismatch { .. }
                | Self::ContentSizeMismatch { .. }
        )
    }

    /// Build an equivalent error for reporting the same failure again.
    ///
    /// `io::Error` is not `Clone`, so the I/O variant is rebuilt from its kind
    /// and message.
    pub fn replay(&self) -> Self {
        match self {
            Self::Io(e) => Self::Io(io::Error::new(e.kind(), e.to_string())),
            Self::ShortRead {
                bits_requested,
                bits_available,
            } => Self::ShortRead {
                bits_requested: *bits_requested,
                bits_available: *bits_available,
            },
            Self::UnsupportedWidth { width } => Self::UnsupportedWidth { width: *width },
            Self::BadMagic { expected, found } => Self::BadMagic {
                expected: *expected,
                found: *found,
            },
            Self::UnsupportedVersion { version } => Self::UnsupportedVersion { version: *version },
            Self::UnsupportedBlockDependence => Self::UnsupportedBlockDependence,
            Self::MalformedHeader { message } => Self::malformed(message.clone()),
            Self::TruncatedHeader { bytes_read } => Self::TruncatedHeader {
                bytes_read: *bytes_read,
            },
            Self::HeaderChecksumMismatch { expected, found } => Self::HeaderChecksumMismatch {
                expected: *expected,
                found: *found,
            },
            Self::TruncatedBlockLength { bytes_read } => Self::TruncatedBlockLength {
                bytes_read: *bytes_read,
            },
            Self::TruncatedBlockData { expected, got } => Self::TruncatedBlockData {
                expected: *expected,
                got: *got,
            },
            Self::BlockTooLarge { size, max } => Self::BlockTooLarge {
                size: *size,
                max: *max,
            },
            Self::BlockDecode {
                compressed_len,
                source,
            } => Self::block_decode(*compressed_len, source.clone()),
            Self::BlockChecksumMismatch {
                block_index,
                expected,
                found,
            } => Self::BlockChecksumMismatch {
                block_index: *block_index,
                expected: *expected,
                found: *found,
            },
            Self::TruncatedChecksum { what, bytes_read } => Self::TruncatedChecksum {
                what,
                bytes_read: *bytes_read,
            },
            Self::ContentChecksumMismatch { expected, found } => Self::ContentChecksumMismatch {
                expected: *expected,
                found: *found,
            },
            Self::ContentSizeMismatch { expected, actual } => Self::ContentSizeMismatch {
                expected: *expected,
                actual: *actual,
            },
        }
    }
}

impl From<FrameError> for io::Error {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::Io(e) => e,
            other => {
                let kind = match &other {
                    FrameError::ShortRead { .. }
                    | FrameError::TruncatedHeader { .. }
                    | FrameError::TruncatedBlockLength { .. }
                    | FrameError::TruncatedBlockData { .. }
                    | FrameError::TruncatedChecksum { .. } => io::ErrorKind::UnexpectedEof,
                    FrameError::UnsupportedWidth { .. }
                    | FrameError::UnsupportedVersion { .. }
                    | FrameError::UnsupportedBlockDependence => io::ErrorKind::Unsupported,
                    _ => io::ErrorKind::InvalidData,
                };
                io::Error::new(kind, other)
            }
        }
    }
}
