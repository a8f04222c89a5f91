#![no_main]
use libfuzzer_sys::fuzz_target;
use lzframe_stream::{DecoderConfig, FrameDecoder};
use std::io::{Cursor, Read};

fuzz_target!(|data: &[u8]| {
    let _ = lzframe_stream::decode_all(Cursor::new(data));

    // Small reads through the strict decoder cover the drain/fetch boundary.
    if let Ok(mut decoder) = FrameDecoder::with_config(Cursor::new(data), DecoderConfig::STRICT) {
        let mut buf = [0u8; 7];
        while let Ok(n) = decoder.read(&mut buf) {
            if n == 0 {
                break;
            }
        }
    }
});
