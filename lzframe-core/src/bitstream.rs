//! MSB-first bit field reader.
//!
//! Packed headers store fields of mixed widths as one contiguous bitstream,
//! most significant bit first within every byte. [`BitFieldReader`] pulls
//! bytes from an underlying reader one at a time, only when a bit of that
//! byte is actually requested, so after `n` bits exactly `ceil(n / 8)` bytes
//! have left the source. Byte alignment is never implicit: callers that
//! switch to byte-level reads must call [`BitFieldReader::align_to_byte`].
//!
//! # Example
//!
//! ```
//! use lzframe_core::bitstream::BitFieldReader;
//! use std::io::Cursor;
//!
//! let mut reader = BitFieldReader::new(Cursor::new([0b1011_0100, 0xFF]));
//! let fields = reader.read_fields(&[1, 2, 5]).unwrap();
//! assert_eq!(fields, vec![0b1, 0b01, 0b10100]);
//! assert_eq!(reader.read_field(8).unwrap(), 0xFF);
//! ```

use crate::error::{FrameError, Result};
use std::io::{ErrorKind, Read};

/// Widest field a single read can return.
pub const MAX_FIELD_WIDTH: u32 = 64;

/// A bit-level reader over any `Read`, most significant bit first.
#[derive(Debug)]
pub struct BitFieldReader<R: Read> {
    /// Underlying reader.
    reader: R,
    /// Byte currently being consumed.
    current: u8,
    /// Unread bits remaining in `current` (0-8).
    bits_left: u8,
    /// Total bits handed out or dropped by alignment.
    total_bits_read: u64,
    /// Bytes pulled from the underlying reader.
    bytes_consumed: u64,
}

impl<R: Read> BitFieldReader<R> {
    /// Create a new `BitFieldReader` wrapping the given reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            current: 0,
            bits_left: 0,
            total_bits_read: 0,
            bytes_consumed: 0,
        }
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Get a mutable reference to the underlying reader.
    ///
    /// Reading from it directly while the reader is not byte aligned skips
    /// the unread bits of the current byte.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Consume this `BitFieldReader` and return the underlying reader.
    ///
    /// Unread bits of a partially consumed byte are lost.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Total number of bits read so far, including bits dropped by alignment.
    pub fn bits_read(&self) -> u64 {
        self.total_bits_read
    }

    /// Number of bytes pulled from the underlying reader.
    pub fn bytes_consumed(&self) -> u64 {
        self.bytes_consumed
    }

    /// Whether the next read starts on a byte boundary.
    pub fn is_byte_aligned(&self) -> bool {
        self.bits_left == 0
    }

    /// Drop the unread bits of the current byte.
    ///
    /// Returns the number of bits skipped (0 when already aligned).
    pub fn align_to_byte(&mut self) -> u32 {
        let dropped = self.bits_left;
        self.bits_left = 0;
        self.total_bits_read += dropped as u64;
        dropped as u32
    }

    /// Pull one byte from the source, or `None` at end of input.
    fn next_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.bytes_consumed += 1;
                    return Ok(Some(byte[0]));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Read one field of `width` bits (0-64), MSB-first.
    pub fn read_field(&mut self, width: u32) -> Result<u64> {
        if width > MAX_FIELD_WIDTH {
            return Err(FrameError::UnsupportedWidth { width });
        }

        let mut value = 0u64;
        let mut remaining = width;

        while remaining > 0 {
            if self.bits_left == 0 {
                match self.next_byte()? {
                    Some(byte) => {
                        self.current = byte;
                        self.bits_left = 8;
                    }
                    None => {
                        return Err(FrameError::ShortRead {
                            bits_requested: width as u64,
                            bits_available: (width - remaining) as u64,
                        });
                    }
                }
            }

            let take = remaining.min(self.bits_left as u32);
            let shift = self.bits_left as u32 - take;
            let mask = ((1u16 << take) - 1) as u8;
            let chunk = (self.current >> shift) & mask;

            value = (value << take) | chunk as u64;
            self.bits_left -= take as u8;
            self.total_bits_read += take as u64;
            remaining -= take;
        }

        Ok(value)
    }

    /// Read a sequence of fields, returning one value per requested width.
    ///
    /// All widths are checked before any bit is consumed. On exhaustion the
    /// `ShortRead` error reports the whole batch.
    pub fn read_fields(&mut self, widths: &[u32]) -> Result<Vec<u64>> {
        if let Some(&width) = widths.iter().find(|&&w| w > MAX_FIELD_WIDTH) {
            return Err(FrameError::UnsupportedWidth { width });
        }

        let total: u64 = widths.iter().map(|&w| w as u64).sum();
        let mut values = Vec::with_capacity(widths.len());
        let mut done = 0u64;

        for &width in widths {
            match self.read_field(width) {
                Ok(v) => values.push(v),
                Err(FrameError::ShortRead { bits_available, .. }) => {
                    return Err(FrameError::ShortRead {
                        bits_requested: total,
                        bits_available: done + bits_available,
                    });
                }
                Err(e) => return Err(e),
            }
            done += width as u64;
        }

        Ok(values)
    }

    /// Read a single bit as a flag.
    pub fn read_flag(&mut self) -> Result<bool> {
        Ok(self.read_field(1)? != 0)
    }
}
