//! E2E Test Suite 02: Incremental and streaming behaviour
//!
//! Validates that chopping input into arbitrary pieces — on either side of
//! the codec — never changes the bytes produced:
//! - split compression equals one-shot compression, at every split point
//!   of a small input and coarse split points of a large one
//! - fragmented decompression equals one-shot decompression
//! - the io::Write / io::Read adapters agree with the one-shot helpers

use std::io::{Read, Write};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pkdcl::{
    compress_to_vec, decompress_to_vec, Coder, Compressor, Decompressor, DictSize, ExplodeReader,
    ImplodeWriter,
};

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: split compression at every index
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn every_split_point_matches_one_shot() {
    let input = b"it was the best of times, it was the worst of times";
    let whole = compress_to_vec(input, DictSize::Size1K);
    for k in 0..=input.len() {
        let mut c = Compressor::new(DictSize::Size1K);
        let mut out = vec![0u8; c.max_output_bytes(input.len())];
        let n1 = c.update(&input[..k], &mut out, false).unwrap();
        let n2 = c.update(&input[k..], &mut out[n1..], true).unwrap();
        assert_eq!(whole, out[..n1 + n2], "split at {k}");
    }
}

#[test]
fn many_small_updates_match_one_shot() {
    let mut rng = StdRng::seed_from_u64(0x5712);
    let input: Vec<u8> = (0..50_000)
        .map(|i| if i % 7 == 0 { rng.gen() } else { (i % 251) as u8 })
        .collect();
    let whole = compress_to_vec(&input, DictSize::Size4K);

    let mut c = Compressor::new(DictSize::Size4K);
    let mut out = vec![0u8; c.max_output_bytes(input.len())];
    let mut produced = 0;
    let mut fed = 0;
    while fed < input.len() {
        let step = rng.gen_range(1..2000).min(input.len() - fed);
        produced += c
            .update(&input[fed..fed + step], &mut out[produced..], false)
            .unwrap();
        fed += step;
    }
    produced += c.update(&[], &mut out[produced..], true).unwrap();
    assert_eq!(whole, out[..produced]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: fragmented decompression
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn fragmented_decode_chunk_sizes() {
    let mut rng = StdRng::seed_from_u64(0x00D3);
    let input: Vec<u8> = (0..40_000).map(|_| rng.gen_range(b'a'..=b'f')).collect();
    let compressed = compress_to_vec(&input, DictSize::Size2K);

    for chunk in [1usize, 2, 3, 7, 4096] {
        let mut d = Decompressor::new();
        let mut out = vec![0u8; input.len() + 16];
        let mut written = 0;
        let mut parts = compressed.chunks(chunk).peekable();
        while let Some(part) = parts.next() {
            let flush = parts.peek().is_none();
            written += d.update(part, &mut out[written..], flush).unwrap();
        }
        assert_eq!(&out[..written], &input[..], "chunk size {chunk}");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: io adapters
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn writer_equals_one_shot() {
    let input: Vec<u8> = b"for sale: baby shoes, never worn. ".repeat(100);
    let whole = compress_to_vec(&input, DictSize::Size2K);

    let mut w = ImplodeWriter::new(Vec::new(), DictSize::Size2K);
    for chunk in input.chunks(33) {
        w.write_all(chunk).unwrap();
    }
    let streamed = w.finish().unwrap();
    assert_eq!(whole, streamed);
}

#[test]
fn reader_in_tiny_reads() {
    let input: Vec<u8> = (0u32..5000).map(|i| (i * i % 256) as u8).collect();
    let compressed = compress_to_vec(&input, DictSize::Size1K);

    let mut r = ExplodeReader::new(&compressed[..]);
    let mut out = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match r.read(&mut byte).unwrap() {
            0 => break,
            _ => out.push(byte[0]),
        }
    }
    assert_eq!(out, input);
}

#[test]
fn chained_writer_reader_pipeline() {
    // Compress through the Write adapter straight into the Read adapter.
    let input = b"round trip through both adapters".repeat(64);
    let mut w = ImplodeWriter::new(Vec::new(), DictSize::Size4K);
    w.write_all(&input).unwrap();
    let compressed = w.finish().unwrap();
    let mut out = Vec::new();
    ExplodeReader::new(&compressed[..])
        .read_to_end(&mut out)
        .unwrap();
    assert_eq!(out, input);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: simulate stays truthful under streaming
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn simulate_is_exact_between_updates() {
    let mut rng = StdRng::seed_from_u64(0x51A1);
    let mut c = Compressor::new(DictSize::Size2K);
    let mut out = vec![0u8; 1 << 20];
    let mut produced = 0;
    for round in 0..20 {
        let n = rng.gen_range(0..3000);
        let chunk: Vec<u8> = (0..n).map(|_| rng.gen_range(0..16u8)).collect();
        let flush = round == 19;
        let predicted = c.simulate(&chunk, flush).unwrap();
        let written = c.update(&chunk, &mut out[produced..], flush).unwrap();
        assert_eq!(predicted, written, "round {round}");
        produced += written;
    }
    assert!(decompress_to_vec(&out[..produced]).is_ok());
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: max_output_bytes is a true bound from a fresh stream
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn max_output_bytes_bounds_one_shot() {
    let mut rng = StdRng::seed_from_u64(0xB0B0);
    for n in [0usize, 1, 2, 100, 10_000] {
        let data: Vec<u8> = (0..n).map(|_| rng.gen()).collect();
        let c = Compressor::new(DictSize::Size2K);
        let bound = c.max_output_bytes(n);
        let actual = compress_to_vec(&data, DictSize::Size2K).len();
        assert!(actual <= bound, "bound {bound} < actual {actual} for n={n}");
    }
}
