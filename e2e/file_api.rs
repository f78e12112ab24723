//! E2E Test Suite 05: File helpers
//!
//! File-to-file round-trips through `compress_file` / `decompress_file`
//! with scratch files, including byte-count reporting and failure paths.

use std::fs;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::tempdir;

use pkdcl::{compress_file, decompress_file, DictSize};

#[test]
fn file_roundtrip_with_counts() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("input.bin");
    let packed = dir.path().join("input.bin.pkd");
    let unpacked = dir.path().join("restored.bin");

    let mut rng = StdRng::seed_from_u64(0xF11E);
    let data: Vec<u8> = (0..200_000)
        .map(|i| if i % 3 == 0 { rng.gen_range(0..8u8) } else { 0x61 })
        .collect();
    fs::write(&src, &data).unwrap();

    let (cin, cout) = compress_file(&src, &packed, DictSize::Size4K).unwrap();
    assert_eq!(cin, data.len() as u64);
    assert_eq!(cout, fs::metadata(&packed).unwrap().len());
    assert!(cout < cin);

    let (din, dout) = decompress_file(&packed, &unpacked).unwrap();
    assert_eq!(din, cout);
    assert_eq!(dout, data.len() as u64);
    assert_eq!(fs::read(&unpacked).unwrap(), data);
}

#[test]
fn empty_file_roundtrip() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("empty");
    let packed = dir.path().join("empty.pkd");
    let unpacked = dir.path().join("empty.out");
    fs::write(&src, b"").unwrap();

    let (cin, cout) = compress_file(&src, &packed, DictSize::Size1K).unwrap();
    assert_eq!((cin, cout), (0, 4));
    let (din, dout) = decompress_file(&packed, &unpacked).unwrap();
    assert_eq!((din, dout), (4, 0));
    assert_eq!(fs::read(&unpacked).unwrap(), b"");
}

#[test]
fn missing_input_reports_path() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    let out = dir.path().join("out.pkd");
    let err = compress_file(&missing, &out, DictSize::Size2K).unwrap_err();
    assert!(format!("{err:#}").contains("does-not-exist"));
}

#[test]
fn corrupt_file_fails_decompression() {
    let dir = tempdir().unwrap();
    let bad = dir.path().join("bad.pkd");
    let out = dir.path().join("out");
    fs::write(&bad, [0x09, 0x09, 0x00, 0x00]).unwrap();
    assert!(decompress_file(&bad, &out).is_err());
}
