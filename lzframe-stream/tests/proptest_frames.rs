//! Property-based tests for frame decoding.
//!
//! Run with: cargo test -p lzframe-stream --test proptest_frames

mod common;

use proptest::prelude::*;

use common::{FrameBuilder, read_in_chunks};
use lzframe_stream::{DecoderConfig, FrameDecoder, decode_all};
use std::io::Cursor;

/// One block's content and whether it is stored uncompressed.
fn block_strategy() -> impl Strategy<Value = (Vec<u8>, bool)> {
    let content = prop_oneof![
        prop::collection::vec(any::<u8>(), 0..2048),
        prop::collection::vec(0u8..4, 0..4096),
    ];
    (content, any::<bool>())
}

/// Optional frame features toggled independently.
#[derive(Debug, Clone, Copy)]
struct Features {
    block_checksum: bool,
    content_checksum: bool,
    content_size: bool,
}

fn features_strategy() -> impl Strategy<Value = Features> {
    (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(block_checksum, content_checksum, content_size)| Features {
            block_checksum,
            content_checksum,
            content_size,
        },
    )
}

fn build_frame(blocks: &[(Vec<u8>, bool)], features: Features) -> (Vec<u8>, Vec<u8>) {
    let mut builder = FrameBuilder::new();
    if features.block_checksum {
        builder = builder.block_checksum();
    }
    if features.content_checksum {
        builder = builder.content_checksum();
    }
    if features.content_size {
        let total: usize = blocks.iter().map(|(data, _)| data.len()).sum();
        builder = builder.content_size(total as u64);
    }
    for (data, stored) in blocks {
        builder = if *stored {
            builder.stored(data)
        } else {
            builder.data(data)
        };
    }
    (builder.build(), builder.content().to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        max_shrink_iters: 200,
        ..ProptestConfig::default()
    })]

    /// Property: output is the concatenation of all blocks, whatever the read size.
    #[test]
    fn prop_blocks_concatenate_any_read_size(
        blocks in prop::collection::vec(block_strategy(), 0..8),
        features in features_strategy(),
        chunk in 1usize..5000,
    ) {
        let (frame, expected) = build_frame(&blocks, features);
        let mut decoder = FrameDecoder::with_config(Cursor::new(frame), DecoderConfig::STRICT).unwrap();
        let out = read_in_chunks(&mut decoder, chunk).unwrap();
        prop_assert_eq!(out, expected);
        prop_assert!(decoder.is_finished());

        let non_empty = blocks.iter().filter(|(data, _)| !data.is_empty()).count();
        prop_assert!(decoder.blocks_decoded() >= non_empty as u64);
    }

    /// Property: a truncated frame never yields bytes that are not a prefix of the content.
    #[test]
    fn prop_truncated_frame_yields_prefix(
        blocks in prop::collection::vec(block_strategy(), 1..4),
        features in features_strategy(),
        cut in any::<prop::sample::Index>(),
    ) {
        let (frame, expected) = build_frame(&blocks, features);
        let len = cut.index(frame.len());
        if let Ok(out) = decode_all(Cursor::new(&frame[..len])) {
            prop_assert!(expected.starts_with(&out));
        }
    }

    /// Property: arbitrary bytes after a valid magic never panic the decoder.
    #[test]
    fn prop_arbitrary_frame_body(body in prop::collection::vec(any::<u8>(), 0..1024)) {
        let mut frame = vec![0x04, 0x22, 0x4D, 0x18];
        frame.extend_from_slice(&body);
        let _ = decode_all(Cursor::new(frame));
    }

    /// Property: flipping one byte of a valid frame never panics the decoder.
    #[test]
    fn prop_single_byte_corruption(
        blocks in prop::collection::vec(block_strategy(), 1..4),
        features in features_strategy(),
        at in any::<prop::sample::Index>(),
        mask in 1u8..=255,
    ) {
        let (mut frame, _) = build_frame(&blocks, features);
        let index = at.index(frame.len());
        frame[index] ^= mask;
        let _ = decode_all(Cursor::new(frame));
    }
}
