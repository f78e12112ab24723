//! E2E Test Suite 04: Error handling
//!
//! Exercises every variant of the error taxonomy end to end, plus the
//! recoverability contract: `OutputFull` leaves state intact, everything
//! else is terminal.

use pkdcl::{compress_to_vec, decompress_to_vec, CodecError, Coder, Compressor, Decompressor, DictSize};

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: header rejection
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn invalid_literal_mode_and_selector() {
    for (mode, selector) in [(2u8, 5u8), (0xFF, 5), (0, 3), (0, 7), (1, 0)] {
        let stream = [mode, selector, 0x01, 0xFF];
        match decompress_to_vec(&stream) {
            Err(CodecError::InvalidHeader { mode: m, selector: s }) => {
                assert_eq!((m, s), (mode, selector));
            }
            other => panic!("expected InvalidHeader, got {other:?}"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: distance past the decoded window
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn distance_beyond_history() {
    // One literal, then a length-3 copy from distance code 5.
    let stream = [0x00, 0x05, 0x82, 0x7E, 0x09, 0xF8, 0x07];
    assert_eq!(
        decompress_to_vec(&stream),
        Err(CodecError::InvalidData("copy distance exceeds window"))
    );
}

#[test]
fn distance_into_empty_window() {
    // Copy as the very first item: any distance exceeds zero history.
    let mut d = Decompressor::new();
    let mut out = [0u8; 16];
    // header then flag=1 len=3 (bits 111) dist code 0 low 00000, EOS
    let stream = [0x00, 0x05, 0x1F, 0x04, 0xFC, 0x03];
    assert!(matches!(
        d.update(&stream, &mut out, true),
        Err(CodecError::InvalidData(_))
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: truncation and trailing data
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn truncated_streams() {
    let full = compress_to_vec(b"truncate me, I dare you", DictSize::Size2K);
    for cut in 0..full.len() - 1 {
        let r = decompress_to_vec(&full[..cut]);
        assert!(
            matches!(r, Err(CodecError::Truncated) | Err(CodecError::InvalidHeader { .. })),
            "cut at {cut} gave {r:?}"
        );
    }
}

#[test]
fn trailing_bytes_after_eos() {
    let mut stream = compress_to_vec(b"payload", DictSize::Size1K).to_vec();
    stream.extend_from_slice(&[0x00, 0x00]);
    assert_eq!(decompress_to_vec(&stream), Err(CodecError::TrailingBytes));
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: OutputFull recoverability
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn compressor_output_full_is_retryable() {
    let input = b"same state before and after the failed call";
    let mut c = Compressor::new(DictSize::Size2K);
    let mut small = [0u8; 4];
    for _ in 0..3 {
        assert_eq!(c.update(input, &mut small, true), Err(CodecError::OutputFull));
    }
    let mut out = vec![0u8; c.max_output_bytes(input.len())];
    let n = c.update(input, &mut out, true).unwrap();
    assert_eq!(out[..n], compress_to_vec(input, DictSize::Size2K)[..]);
}

#[test]
fn decompressor_zero_capacity_is_retryable() {
    let compressed = compress_to_vec(b"zero capacity first", DictSize::Size2K);
    let mut d = Decompressor::new();
    let mut none: [u8; 0] = [];
    assert_eq!(d.update(&compressed, &mut none, false), Err(CodecError::OutputFull));
    let mut out = vec![0u8; 64];
    let n = d.update(&[], &mut out, true).unwrap();
    assert_eq!(&out[..n], b"zero capacity first");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: terminal errors stay terminal; reset recovers
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn reset_after_terminal_error() {
    let mut d = Decompressor::new();
    let mut out = [0u8; 16];
    assert!(d.update(&[0x05, 0x05], &mut out, false).is_err());
    d.reset();
    let good = compress_to_vec(b"ok", DictSize::Size2K);
    let n = d.update(&good, &mut out, true).unwrap();
    assert_eq!(&out[..n], b"ok");
}

#[test]
fn compressor_rejects_input_after_finish() {
    let mut c = Compressor::new(DictSize::Size4K);
    let mut out = [0u8; 64];
    c.update(b"done", &mut out, true).unwrap();
    assert!(matches!(
        c.update(b"late", &mut out, false),
        Err(CodecError::InvalidData(_))
    ));
    assert_eq!(c.update(&[], &mut out, true), Ok(0));
}
