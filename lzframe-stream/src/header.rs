//! LZ4 frame header parsing and validation.
//!
//! The header layout is
//!
//! ```text
//! magic(32) | FLG: version(2) B.Indep(1) B.Checksum(1) C.Size(1) C.Checksum(1) reserved(1) DictID(1)
//!           | BD:  reserved(1) B.MaxSize(3) reserved(4)
//!           | [content size(64)] [dict id(32)] | HC(8)
//! ```
//!
//! Fields are pulled MSB-first through a [`BitFieldReader`]; the multi-byte
//! values are little-endian on the wire and are byte-swapped after reading.

use crate::config::DecoderConfig;
use lzframe_core::bitstream::BitFieldReader;
use lzframe_core::error::{FrameError, Result};
use std::io::{ErrorKind, Read};
use xxhash_rust::xxh32::xxh32;

/// LZ4 frame magic number.
pub const LZ4_FRAME_MAGIC: u32 = 0x184D2204;

/// The only frame version this decoder understands.
pub const SUPPORTED_VERSION: u8 = 1;

/// Field widths of magic, FLG and BD, in wire order.
const FIXED_FIELDS: [u32; 11] = [32, 2, 1, 1, 1, 1, 1, 1, 1, 3, 4];

/// Block maximum sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BlockMaxSize {
    /// 64 KB maximum block size.
    Size64KB = 4,
    /// 256 KB maximum block size.
    Size256KB = 5,
    /// 1 MB maximum block size.
    Size1MB = 6,
    /// 4 MB maximum block size.
    Size4MB = 7,
}

impl BlockMaxSize {
    /// Get the actual byte size for this block max setting.
    pub fn size_bytes(self) -> usize {
        match self {
            BlockMaxSize::Size64KB => 64 * 1024,
            BlockMaxSize::Size256KB => 256 * 1024,
            BlockMaxSize::Size1MB => 1024 * 1024,
            BlockMaxSize::Size4MB => 4 * 1024 * 1024,
        }
    }

    /// Convert from the 3-bit BD code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            4 => Some(BlockMaxSize::Size64KB),
            5 => Some(BlockMaxSize::Size256KB),
            6 => Some(BlockMaxSize::Size1MB),
            7 => Some(BlockMaxSize::Size4MB),
            _ => None,
        }
    }

    /// The 3-bit BD code.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// FLG byte flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameFlags {
    /// Blocks were compressed without referencing earlier blocks.
    pub block_independence: bool,
    /// Each block is followed by an XXH32 of its payload.
    pub block_checksum: bool,
    /// The header carries the decompressed content size.
    pub content_size: bool,
    /// The end marker is followed by an XXH32 of the decompressed content.
    pub content_checksum: bool,
    /// Reserved FLG bit.
    pub reserved: bool,
    /// The header carries a dictionary id.
    pub dict_id: bool,
}

/// Reserved bits of the BD byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReservedBits {
    /// Top bit of BD.
    pub high: u8,
    /// Low four bits of BD.
    pub low: u8,
}

/// A parsed LZ4 frame header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    /// Magic as read MSB-first from the wire.
    pub raw_magic: u32,
    /// Frame version (2 bits).
    pub version: u8,
    /// FLG flags.
    pub flags: FrameFlags,
    /// Block maximum size code (3 bits).
    pub block_max_size_code: u8,
    /// BD reserved fields.
    pub reserved: ReservedBits,
    /// Decompressed content size, when flagged.
    pub content_size: Option<u64>,
    /// Dictionary id, when flagged.
    pub dict_id: Option<u32>,
    /// Stored header checksum byte.
    pub header_checksum: u8,
}

impl FrameHeader {
    /// Parse a frame header from a bit reader positioned at the magic.
    ///
    /// Only the fields the flags announce are read. Running out of input
    /// anywhere fails with [`FrameError::TruncatedHeader`].
    pub fn parse<R: Read>(bits: &mut BitFieldReader<R>) -> Result<Self> {
        let start = bits.bytes_consumed();
        Self::parse_fields(bits).map_err(|e| match e {
            FrameError::ShortRead { .. } => FrameError::TruncatedHeader {
                bytes_read: bits.bytes_consumed() - start,
            },
            FrameError::Io(ref io) if io.kind() == ErrorKind::UnexpectedEof => {
                FrameError::TruncatedHeader {
                    bytes_read: bits.bytes_consumed() - start,
                }
            }
            other => other,
        })
    }

    fn parse_fields<R: Read>(bits: &mut BitFieldReader<R>) -> Result<Self> {
        let f = bits.read_fields(&FIXED_FIELDS)?;

        let flags = FrameFlags {
            block_independence: f[2] != 0,
            block_checksum: f[3] != 0,
            content_size: f[4] != 0,
            content_checksum: f[5] != 0,
            reserved: f[6] != 0,
            dict_id: f[7] != 0,
        };

        // The fixed part is 48 bits, this is a no-op for well-formed layouts
        bits.align_to_byte();

        let content_size = if flags.content_size {
            Some(bits.read_field(64)?.swap_bytes())
        } else {
            None
        };
        let dict_id = if flags.dict_id {
            Some((bits.read_field(32)? as u32).swap_bytes())
        } else {
            None
        };
        let header_checksum = bits.read_field(8)? as u8;

        Ok(Self {
            raw_magic: f[0] as u32,
            version: f[1] as u8,
            flags,
            block_max_size_code: f[9] as u8,
            reserved: ReservedBits {
                high: f[8] as u8,
                low: f[10] as u8,
            },
            content_size,
            dict_id,
            header_checksum,
        })
    }

    /// Parse a frame header straight from a byte reader.
    ///
    /// Exactly [`header_len`](Self::header_len) bytes are consumed on success.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bits = BitFieldReader::new(reader);
        Self::parse(&mut bits)
    }

    /// Check the header against the decoder's acceptance rules.
    pub fn validate(&self, config: &DecoderConfig) -> Result<()> {
        let magic = self.magic();
        if magic != LZ4_FRAME_MAGIC {
            return Err(FrameError::BadMagic {
                expected: LZ4_FRAME_MAGIC,
                found: magic,
            });
        }
        if self.version != SUPPORTED_VERSION {
            return Err(FrameError::UnsupportedVersion {
                version: self.version,
            });
        }
        if !self.flags.block_independence {
            return Err(FrameError::UnsupportedBlockDependence);
        }

        if config.strict_reserved_bits {
            if self.has_reserved_bits() {
                return Err(FrameError::malformed(format!(
                    "reserved bits set (FLG bit 1: {}, BD high: {}, BD low: {:#x})",
                    self.flags.reserved as u8, self.reserved.high, self.reserved.low
                )));
            }
            if self.block_max_size().is_none() {
                return Err(FrameError::malformed(format!(
                    "invalid block max size code {}",
                    self.block_max_size_code
                )));
            }
        }

        if config.verify_header_checksum {
            let expected = self.expected_checksum();
            if expected != self.header_checksum {
                return Err(FrameError::HeaderChecksumMismatch {
                    expected,
                    found: self.header_checksum,
                });
            }
        }

        Ok(())
    }

    /// Magic decoded as the little-endian value the format defines.
    pub fn magic(&self) -> u32 {
        self.raw_magic.swap_bytes()
    }

    /// Decoded block maximum size, if the code is defined.
    pub fn block_max_size(&self) -> Option<BlockMaxSize> {
        BlockMaxSize::from_code(self.block_max_size_code)
    }

    /// Largest block payload this frame may carry under `config`.
    pub fn block_limit(&self, config: &DecoderConfig) -> usize {
        self.block_max_size()
            .map_or(config.max_block_size, |size| size.size_bytes())
            .min(config.max_block_size)
    }

    /// Whether any reserved bit is set.
    pub fn has_reserved_bits(&self) -> bool {
        self.flags.reserved || self.reserved.high != 0 || self.reserved.low != 0
    }

    /// FLG byte as it appeared on the wire.
    pub fn flg_byte(&self) -> u8 {
        let f = &self.flags;
        ((self.version & 0x03) << 6)
            | ((f.block_independence as u8) << 5)
            | ((f.block_checksum as u8) << 4)
            | ((f.content_size as u8) << 3)
            | ((f.content_checksum as u8) << 2)
            | ((f.reserved as u8) << 1)
            | (f.dict_id as u8)
    }

    /// BD byte as it appeared on the wire.
    pub fn bd_byte(&self) -> u8 {
        ((self.reserved.high & 0x01) << 7)
            | ((self.block_max_size_code & 0x07) << 4)
            | (self.reserved.low & 0x0F)
    }

    /// Descriptor bytes covered by the header checksum.
    pub fn descriptor_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(14);
        bytes.push(self.flg_byte());
        bytes.push(self.bd_byte());
        if let Some(size) = self.content_size {
            bytes.extend_from_slice(&size.to_le_bytes());
        }
        if let Some(id) = self.dict_id {
            bytes.extend_from_slice(&id.to_le_bytes());
        }
        bytes
    }

    /// Header checksum computed from the descriptor.
    pub fn expected_checksum(&self) -> u8 {
        (xxh32(&self.descriptor_bytes(), 0) >> 8) as u8
    }

    /// On-wire header length in bytes (7, 11, 15 or 19).
    pub fn header_len(&self) -> usize {
        7 + if self.flags.content_size { 8 } else { 0 } + if self.flags.dict_id { 4 } else { 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn frame_header(flg: u8, bd: u8, extra: &[u8]) -> Vec<u8> {
        let mut bytes = LZ4_FRAME_MAGIC.to_le_bytes().to_vec();
        let mut desc = vec![flg, bd];
        desc.extend_from_slice(extra);
        let hc = (xxh32(&desc, 0) >> 8) as u8;
        bytes.extend_from_slice(&desc);
        bytes.push(hc);
        bytes
    }

    #[test]
    fn test_parse_minimal() {
        let bytes = frame_header(0x64, 0x40, &[]);
        let header = FrameHeader::read_from(&mut Cursor::new(&bytes)).unwrap();

        assert_eq!(header.raw_magic, 0x04224D18);
        assert_eq!(header.magic(), LZ4_FRAME_MAGIC);
        assert_eq!(header.version, 1);
        assert!(header.flags.block_independence);
        assert!(!header.flags.block_checksum);
        assert!(header.flags.content_checksum);
        assert_eq!(header.block_max_size(), Some(BlockMaxSize::Size64KB));
        assert_eq!(header.content_size, None);
        assert_eq!(header.dict_id, None);
        assert_eq!(header.header_len(), 7);
        assert_eq!(header.header_checksum, bytes[6]);

        header.validate(&DecoderConfig::STRICT).unwrap();
    }

    #[test]
    fn test_optional_fields_little_endian() {
        let mut extra = 0x0102_0304_0506_0708u64.to_le_bytes().to_vec();
        extra.extend_from_slice(&0xCAFE_BABEu32.to_le_bytes());
        let bytes = frame_header(0x69, 0x70, &extra);

        let mut cursor = Cursor::new(&bytes);
        let header = FrameHeader::read_from(&mut cursor).unwrap();
        assert_eq!(header.content_size, Some(0x0102_0304_0506_0708));
        assert_eq!(header.dict_id, Some(0xCAFE_BABE));
        assert_eq!(header.block_max_size(), Some(BlockMaxSize::Size4MB));
        assert_eq!(header.header_len(), 19);
        assert_eq!(cursor.position(), 19);
        assert_eq!(header.descriptor_bytes(), &bytes[4..18]);
        header.validate(&DecoderConfig::STRICT).unwrap();
    }

    #[test]
    fn test_no_bytes_past_header() {
        let mut bytes = frame_header(0x64, 0x40, &[]);
        bytes.extend_from_slice(&[0xAA; 8]);
        let mut cursor = Cursor::new(&bytes);
        FrameHeader::read_from(&mut cursor).unwrap();
        assert_eq!(cursor.position(), 7);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = frame_header(0x64, 0x40, &[]);
        bytes[0] = 0x05;
        let header = FrameHeader::read_from(&mut Cursor::new(&bytes)).unwrap();
        match header.validate(&DecoderConfig::default()) {
            Err(FrameError::BadMagic { expected, found }) => {
                assert_eq!(expected, LZ4_FRAME_MAGIC);
                assert_eq!(found, 0x184D2205);
            }
            other => panic!("expected bad magic, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_version() {
        // version 2
        let bytes = frame_header(0xA4, 0x40, &[]);
        let header = FrameHeader::read_from(&mut Cursor::new(&bytes)).unwrap();
        assert!(matches!(
            header.validate(&DecoderConfig::default()),
            Err(FrameError::UnsupportedVersion { version: 2 })
        ));
    }

    #[test]
    fn test_block_dependence_rejected() {
        let bytes = frame_header(0x44, 0x40, &[]);
        let header = FrameHeader::read_from(&mut Cursor::new(&bytes)).unwrap();
        assert!(matches!(
            header.validate(&DecoderConfig::default()),
            Err(FrameError::UnsupportedBlockDependence)
        ));
    }

    #[test]
    fn test_reserved_bits_policy() {
        for (flg, bd) in [(0x66, 0x40), (0x64, 0xC0), (0x64, 0x41)] {
            let bytes = frame_header(flg, bd, &[]);
            let header = FrameHeader::read_from(&mut Cursor::new(&bytes)).unwrap();
            assert!(header.has_reserved_bits());
            header.validate(&DecoderConfig::LENIENT).unwrap();
            assert!(matches!(
                header.validate(&DecoderConfig::STRICT),
                Err(FrameError::MalformedHeader { .. })
            ));
        }
    }

    #[test]
    fn test_block_max_size_codes() {
        for code in 4..=7u8 {
            let size = BlockMaxSize::from_code(code).unwrap();
            assert_eq!(size.code(), code);
            assert_eq!(size.size_bytes(), 1 << (8 + 2 * code as usize));
        }
        for code in [0u8, 1, 2, 3] {
            assert_eq!(BlockMaxSize::from_code(code), None);
        }
    }

    #[test]
    fn test_invalid_block_size_code() {
        let bytes = frame_header(0x64, 0x20, &[]);
        let header = FrameHeader::read_from(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(header.block_max_size(), None);
        header.validate(&DecoderConfig::LENIENT).unwrap();
        assert!(matches!(
            header.validate(&DecoderConfig::STRICT),
            Err(FrameError::MalformedHeader { .. })
        ));
        assert_eq!(header.block_limit(&DecoderConfig::LENIENT), 4 * 1024 * 1024);
    }

    #[test]
    fn test_block_limit_respects_config() {
        let bytes = frame_header(0x64, 0x70, &[]);
        let header = FrameHeader::read_from(&mut Cursor::new(&bytes)).unwrap();
        let config = DecoderConfig::default().with_max_block_size(1000);
        assert_eq!(header.block_limit(&config), 1000);

        let bytes = frame_header(0x64, 0x40, &[]);
        let header = FrameHeader::read_from(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(header.block_limit(&DecoderConfig::default()), 64 * 1024);
    }

    #[test]
    fn test_header_checksum_policy() {
        let mut bytes = frame_header(0x64, 0x40, &[]);
        bytes[6] ^= 0xFF;
        let header = FrameHeader::read_from(&mut Cursor::new(&bytes)).unwrap();

        header.validate(&DecoderConfig::LENIENT).unwrap();
        match header.validate(&DecoderConfig::STRICT) {
            Err(FrameError::HeaderChecksumMismatch { expected, found }) => {
                assert_eq!(expected, header.expected_checksum());
                assert_eq!(found, bytes[6]);
            }
            other => panic!("expected checksum mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_at_every_length() {
        let bytes = frame_header(0x6C, 0x40, &100u64.to_le_bytes());
        assert_eq!(bytes.len(), 15);
        for len in 0..bytes.len() {
            let err = FrameHeader::read_from(&mut Cursor::new(&bytes[..len])).unwrap_err();
            match err {
                FrameError::TruncatedHeader { bytes_read } => assert_eq!(bytes_read, len as u64),
                other => panic!("length {len}: expected truncation, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_descriptor_roundtrip() {
        let bytes = frame_header(0x7F, 0xFF, &[0; 12]);
        let header = FrameHeader::read_from(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(header.flg_byte(), 0x7F);
        assert_eq!(header.bd_byte(), 0xFF);
        assert_eq!(header.expected_checksum(), bytes[18]);
    }
}
