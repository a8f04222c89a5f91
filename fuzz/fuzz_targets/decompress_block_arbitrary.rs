#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Errors are expected; the output must never exceed the capacity.
    let capacity = data.len().saturating_mul(4).min(1 << 20);
    if let Ok(output) = lzframe_block::decompress_block(data, capacity) {
        assert!(output.len() <= capacity);
    }
});
