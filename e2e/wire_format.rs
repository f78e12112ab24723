//! E2E Test Suite 03: Wire-format pinning
//!
//! Byte-exact vectors keep the bit layout honest: header, LSB-first code
//! packing, the end-of-stream marker, and decode of streams this encoder
//! never produces itself (two-byte copies, variable-literal mode).

use pkdcl::{compress_to_vec, decompress_to_vec, Coder, Compressor, Decompressor, DictSize};

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: canonical encoder vectors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn empty_input_all_dictionary_sizes() {
    // literal-mode 0, selector, then the 16-bit length-519 code `01 FF`.
    assert_eq!(compress_to_vec(b"", DictSize::Size1K), [0x00, 0x04, 0x01, 0xFF]);
    assert_eq!(compress_to_vec(b"", DictSize::Size2K), [0x00, 0x05, 0x01, 0xFF]);
    assert_eq!(compress_to_vec(b"", DictSize::Size4K), [0x00, 0x06, 0x01, 0xFF]);
}

#[test]
fn single_literal_then_eos() {
    // 'A' as a 9-bit literal code, then EOS, zero-padded.
    let out = compress_to_vec(b"A", DictSize::Size2K);
    assert_eq!(out, [0x00, 0x05, 0x82, 0x02, 0xFE, 0x01]);
    assert_eq!(decompress_to_vec(&out).unwrap(), b"A");
}

#[test]
fn three_literal_vector() {
    let out = compress_to_vec(b"AAA", DictSize::Size2K);
    assert_eq!(out, [0x00, 0x05, 0x82, 0x04, 0x09, 0x0A, 0xF8, 0x07]);
}

#[test]
fn abcabc_vector() {
    let out = compress_to_vec(b"ABCABC", DictSize::Size2K);
    assert_eq!(out, [0x00, 0x05, 0x82, 0x08, 0x19, 0xFA, 0x22, 0xE0, 0x1F]);
    assert_eq!(decompress_to_vec(&out).unwrap(), b"ABCABC");
}

#[test]
fn distance_zero_run_vector() {
    let out = compress_to_vec(b"AAAAA", DictSize::Size2K);
    assert_eq!(out, [0x00, 0x05, 0x82, 0x04, 0x7D, 0x10, 0xF0, 0x0F]);
    assert_eq!(decompress_to_vec(&out).unwrap(), b"AAAAA");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: every flushed stream ends with the EOS code
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn flushed_streams_end_in_eos_bits() {
    // The 16 EOS bits are 0x01 then 0xFF LSB-first; after zero padding the
    // final byte's set bits must be exactly the tail of that pattern.
    for input in [&b""[..], b"x", b"hello world", &[7u8; 700][..]] {
        let out = compress_to_vec(input, DictSize::Size2K);
        assert!(out.len() >= 4);
        // Re-decoding consumes everything and reaches the end state.
        let mut d = Decompressor::new();
        let mut buf = vec![0u8; input.len() + 8];
        d.update(&out, &mut buf, true).unwrap();
        assert!(d.is_finished());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: decode-only corners of the format
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn decodes_two_byte_copy() {
    // literals 'a' 'b', then a length-2 copy at distance code 1 (two raw
    // low bits instead of the selector's five).
    let stream = [0x00, 0x05, 0xC2, 0x88, 0xED, 0x05, 0xFC, 0x03];
    assert_eq!(decompress_to_vec(&stream).unwrap(), b"abab");
}

#[test]
fn decodes_variable_literals() {
    let stream = [
        0x01, 0x05, 0x50, 0x6C, 0xD3, 0xD4, 0xF1, 0x3D, 0x64, 0x5D, 0x33, 0xE9, 0xA0, 0xF4, 0x7D,
        0x0B, 0xF8, 0x07,
    ];
    assert_eq!(decompress_to_vec(&stream).unwrap(), b"Hello, World! Hello");
}

#[test]
fn decodes_all_literal_code_tiers() {
    // space (4 bits), 'e' (5 bits), 0xFE/0x00 (13 bits), 'A' (6 bits).
    let stream = [0x01, 0x05, 0xDE, 0x06, 0x00, 0x41, 0x52, 0x1C, 0xF0, 0x0F];
    assert_eq!(
        decompress_to_vec(&stream).unwrap(),
        [0x20, 0x65, 0xFE, 0x00, 0x41]
    );
}

#[test]
fn decodes_maximum_run() {
    // Two literals then one 516-byte distance-0 copy: 518 bytes of 0x37.
    let stream = [0x00, 0x05, 0x6E, 0xDC, 0x04, 0xF0, 0x0F, 0x02, 0xFE, 0x01];
    let out = decompress_to_vec(&stream).unwrap();
    assert_eq!(out, vec![0x37u8; 518]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: header field reflection
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn decoder_reports_dictionary_size() {
    for (size, selector) in [
        (DictSize::Size1K, 4u8),
        (DictSize::Size2K, 5),
        (DictSize::Size4K, 6),
    ] {
        let out = compress_to_vec(b"probe", size);
        assert_eq!(out[1], selector);
        let mut d = Decompressor::new();
        let mut buf = [0u8; 16];
        d.update(&out, &mut buf, true).unwrap();
        assert_eq!(d.dict_size(), Some(size));
    }
}

#[test]
fn simulate_vector_sizes() {
    let c = Compressor::new(DictSize::Size2K);
    assert_eq!(c.simulate(b"", true).unwrap(), 4);
    assert_eq!(c.simulate(b"A", true).unwrap(), 6);
    assert_eq!(c.simulate(b"AAA", true).unwrap(), 8);
}
