//! Info command implementation.

use crate::utils::{input_len, open_input};
use lzframe_stream::{DecoderConfig, FrameHeader};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// JSON output for a frame header.
#[derive(Debug, Serialize, Deserialize)]
struct HeaderJson {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_size: Option<u64>,
    magic: String,
    version: u8,
    block_independence: bool,
    block_checksum: bool,
    content_checksum: bool,
    block_max_size_code: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    block_max_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dict_id: Option<u32>,
    header_len: usize,
    header_checksum: u8,
    header_checksum_valid: bool,
    reserved_bits: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl HeaderJson {
    fn from_header(file: &Path, header: &FrameHeader) -> Self {
        Self {
            file: file.display().to_string(),
            file_size: input_len(file),
            magic: format!("{:#010x}", header.magic()),
            version: header.version,
            block_independence: header.flags.block_independence,
            block_checksum: header.flags.block_checksum,
            content_checksum: header.flags.content_checksum,
            block_max_size_code: header.block_max_size_code,
            block_max_size: header.block_max_size().map(|s| s.size_bytes()),
            content_size: header.content_size,
            dict_id: header.dict_id,
            header_len: header.header_len(),
            header_checksum: header.header_checksum,
            header_checksum_valid: header.expected_checksum() == header.header_checksum,
            reserved_bits: header.has_reserved_bits(),
            error: header
                .validate(&DecoderConfig::LENIENT)
                .err()
                .map(|e| e.to_string()),
        }
    }
}

pub fn cmd_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = open_input(input)?;
    let header = FrameHeader::read_from(&mut reader)?;
    let info = HeaderJson::from_header(input, &header);

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Frame Information");
    println!("=================");
    println!("File: {}", info.file);
    if let Some(size) = info.file_size {
        println!("Size: {} bytes", size);
    }
    println!("Magic: {}", info.magic);
    println!("Version: {}", info.version);
    println!();
    println!("Descriptor:");
    println!("  Block independence: {}", info.block_independence);
    println!("  Block checksums: {}", info.block_checksum);
    println!("  Content checksum: {}", info.content_checksum);
    match info.block_max_size {
        Some(size) => println!("  Block max size: {} bytes", size),
        None => println!("  Block max size: undefined (code {})", info.block_max_size_code),
    }
    if let Some(size) = info.content_size {
        println!("  Content size: {} bytes", size);
    }
    if let Some(id) = info.dict_id {
        println!("  Dictionary id: {:#010x}", id);
    }
    println!("  Reserved bits set: {}", info.reserved_bits);
    println!(
        "  Header checksum: {:#04x} ({})",
        info.header_checksum,
        if info.header_checksum_valid { "ok" } else { "mismatch" }
    );
    println!("  Header length: {} bytes", info.header_len);
    if let Some(error) = &info.error {
        println!();
        println!("Not decodable: {}", error);
    }

    Ok(())
}
