//! Cat command implementation.

use crate::utils::{CountingReader, create_progress_bar, decoder_config, input_len, open_input};
use lzframe_stream::FrameDecoder;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

pub fn cmd_cat(
    input: &Path,
    output: Option<&Path>,
    strict: bool,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = create_progress_bar(input_len(input).unwrap_or(0), progress);
    let source = CountingReader::new(open_input(input)?, pb.clone());
    let mut decoder = FrameDecoder::with_config(source, decoder_config(strict))?;

    let written = match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            let n = io::copy(&mut decoder, &mut writer)?;
            writer.flush()?;
            n
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            let n = io::copy(&mut decoder, &mut writer)?;
            writer.flush()?;
            n
        }
    };
    pb.finish_and_clear();

    info!(
        input = %input.display(),
        compressed = decoder.get_ref().count(),
        decoded = written,
        blocks = decoder.blocks_decoded(),
        "decoded frame"
    );
    Ok(())
}
