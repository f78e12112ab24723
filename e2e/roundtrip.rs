//! E2E Test Suite 01: One-shot round-trips
//!
//! Property coverage: `decompress(compress(x)) == x` across all three
//! dictionary sizes for fixed boundary inputs, random corpora of several
//! length classes, and highly repetitive data.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pkdcl::{compress_to_vec, decompress_to_vec, DictSize};

const ALL_SIZES: [DictSize; 3] = [DictSize::Size1K, DictSize::Size2K, DictSize::Size4K];

fn roundtrip(input: &[u8], size: DictSize) {
    let compressed = compress_to_vec(input, size);
    let output = decompress_to_vec(&compressed).unwrap_or_else(|e| {
        panic!("decode failed ({e}) for len {} dict {:?}", input.len(), size)
    });
    assert_eq!(output, input, "len {} dict {:?}", input.len(), size);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: boundary lengths
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn boundary_lengths() {
    let mut rng = StdRng::seed_from_u64(0x0119);
    for n in [0usize, 1, 2, 3, 4, 5, 100] {
        let data: Vec<u8> = (0..n).map(|_| rng.gen()).collect();
        for size in ALL_SIZES {
            roundtrip(&data, size);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: larger random corpora (10 KB and 1 MB)
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn random_10k() {
    let mut rng = StdRng::seed_from_u64(0x1019);
    let data: Vec<u8> = (0..10_000).map(|_| rng.gen()).collect();
    for size in ALL_SIZES {
        roundtrip(&data, size);
    }
}

#[test]
fn random_1m() {
    let mut rng = StdRng::seed_from_u64(0x1020);
    let data: Vec<u8> = (0..1_000_000).map(|_| rng.gen()).collect();
    roundtrip(&data, DictSize::Size4K);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: repetitive inputs (the format's bread and butter)
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn repetitive_patterns() {
    let abc: Vec<u8> = b"abc".iter().copied().cycle().take(30_000).collect();
    let zeros = vec![0u8; 30_000];
    let alternating: Vec<u8> = [0x55u8, 0xAA]
        .iter()
        .copied()
        .cycle()
        .take(30_000)
        .collect();
    for size in ALL_SIZES {
        for data in [&abc, &zeros, &alternating] {
            roundtrip(data, size);
            let compressed = compress_to_vec(data, size);
            assert!(
                compressed.len() < data.len() / 10,
                "repetitive input barely compressed: {} -> {}",
                data.len(),
                compressed.len()
            );
        }
    }
}

#[test]
fn run_lengths_around_match_limit() {
    // 518 is the longest single copy; straddle it.
    for n in [516usize, 517, 518, 519, 520, 1036, 2000] {
        let data = vec![0x42u8; n];
        for size in ALL_SIZES {
            roundtrip(&data, size);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: inputs spanning the dictionary boundary
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn dictionary_wrap() {
    // A period near the window size forces matches across the ring seam.
    let mut rng = StdRng::seed_from_u64(0x2020);
    let unit: Vec<u8> = (0..1000).map(|_| rng.gen()).collect();
    let data: Vec<u8> = unit.iter().copied().cycle().take(20_000).collect();
    for size in ALL_SIZES {
        roundtrip(&data, size);
    }
}

#[test]
fn text_compresses() {
    let text = include_str!("../README.md").as_bytes();
    for size in ALL_SIZES {
        roundtrip(text, size);
    }
    let compressed = compress_to_vec(text, DictSize::Size4K);
    assert!(compressed.len() < text.len() * 3 / 4, "text ratio regressed");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: structured fuzz, many seeds and styles
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn structured_fuzz() {
    let mut rng = StdRng::seed_from_u64(0xF022);
    for trial in 0..60 {
        let n = *[0usize, 1, 5, 17, 100, 1000, 3000, 8000]
            .iter()
            .nth(rng.gen_range(0..8))
            .unwrap();
        let data: Vec<u8> = match trial % 3 {
            0 => (0..n).map(|_| rng.gen()).collect(),
            1 => (0..n).map(|_| rng.gen_range(0..4u8)).collect(),
            _ => {
                // Back-reference-shaped data.
                let mut v: Vec<u8> = Vec::with_capacity(n);
                while v.len() < n {
                    if v.len() > 4 && rng.gen_bool(0.5) {
                        let back = rng.gen_range(1..=v.len().min(4096));
                        for _ in 0..rng.gen_range(1..600usize) {
                            let b = v[v.len() - back];
                            v.push(b);
                        }
                    } else {
                        v.push(rng.gen());
                    }
                }
                v.truncate(n);
                v
            }
        };
        let size = ALL_SIZES[rng.gen_range(0..3)];
        roundtrip(&data, size);
    }
}
