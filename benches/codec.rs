//! Criterion benchmarks for the DCL codec core.
//!
//! Run with:
//!   cargo bench --bench codec

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use pkdcl::{compress_to_vec, Coder, Compressor, Decompressor, DictSize};

/// Synthetic corpus with a text-like mix of runs and back-references.
fn corpus(len: usize) -> Vec<u8> {
    let words: [&[u8]; 8] = [
        b"the ", b"of ", b"stream ", b"window ", b"codec ", b"bytes ", b"match ", b"copy ",
    ];
    let mut out = Vec::with_capacity(len + 16);
    let mut state = 0x2545_F491_4F6C_DD1Du64;
    while out.len() < len {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        out.extend_from_slice(words[(state % 8) as usize]);
    }
    out.truncate(len);
    out
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress");
    for &size in &[DictSize::Size1K, DictSize::Size4K] {
        for &len in &[16_384usize, 262_144] {
            let data = corpus(len);
            let mut dst = vec![0u8; Compressor::new(size).max_output_bytes(len)];
            group.throughput(Throughput::Bytes(len as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("dict_{}", size.bytes()), len),
                &data,
                |b, data| {
                    b.iter(|| {
                        let mut comp = Compressor::new(size);
                        comp.update(data, &mut dst, true).unwrap()
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompress");
    for &len in &[16_384usize, 262_144] {
        let data = corpus(len);
        let compressed = compress_to_vec(&data, DictSize::Size4K);
        let mut dst = vec![0u8; len + 16];
        // Throughput measured in decompressed bytes.
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(
            BenchmarkId::new("dict_4096", len),
            &compressed,
            |b, compressed| {
                b.iter(|| {
                    let mut dec = Decompressor::new();
                    dec.update(compressed, &mut dst, true).unwrap()
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress);
criterion_main!(benches);
