//! Test command implementation.

use crate::utils::{decoder_config, format_size, open_input};
use lzframe_stream::FrameDecoder;
use std::io;
use std::path::Path;

pub fn cmd_test(input: &Path, strict: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("Testing {}", input.display());

    let mut decoder = FrameDecoder::with_config(open_input(input)?, decoder_config(strict))?;
    let decoded = io::copy(&mut decoder, &mut io::sink())?;

    let header = decoder.header();
    println!("  Blocks: {}", decoder.blocks_decoded());
    println!("  Decoded: {} ({} bytes)", format_size(decoded), decoded);
    println!(
        "  Block checksums: {}",
        if header.flags.block_checksum { "verified" } else { "absent" }
    );
    println!(
        "  Content checksum: {}",
        if header.flags.content_checksum { "verified" } else { "absent" }
    );
    println!("Result: OK");
    Ok(())
}
