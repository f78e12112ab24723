//! File and byte-stream helpers over the codec.
//!
//! These are the operations the CLI dispatches to; they are also usable
//! as library entry points.  All I/O is buffered and chunked, so memory
//! use stays flat regardless of input size.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::codec::types::DictSize;
use crate::stream::{ExplodeReader, ImplodeWriter};

/// Chunk size for the copy loops.
const COPY_CHUNK: usize = 64 * 1024;

/// Pass-through writer that counts the bytes it forwards.
struct CountingWriter<W: Write> {
    inner: W,
    count: u64,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Compress everything from `reader` into `writer`.
/// Returns `(raw_bytes_in, compressed_bytes_out)`.
pub fn compress_stream<R: Read, W: Write>(
    reader: &mut R,
    writer: W,
    dict_size: DictSize,
) -> Result<(u64, u64)> {
    let counted = CountingWriter { inner: writer, count: 0 };
    let mut encoder = ImplodeWriter::new(counted, dict_size);
    let mut buf = vec![0u8; COPY_CHUNK];
    let mut total_in = 0u64;
    loop {
        let n = reader.read(&mut buf).context("reading input")?;
        if n == 0 {
            break;
        }
        encoder
            .write_all(&buf[..n])
            .context("writing compressed data")?;
        total_in += n as u64;
    }
    let mut counted = encoder.finish().context("finalizing compressed stream")?;
    counted.flush().context("flushing output")?;
    Ok((total_in, counted.count))
}

/// Decompress everything from `reader` into `writer`.
/// Returns `(compressed_bytes_in, raw_bytes_out)`.
pub fn decompress_stream<R: Read, W: Write>(reader: R, writer: &mut W) -> Result<(u64, u64)> {
    let mut decoder = ExplodeReader::new(CountingReader { inner: reader, count: 0 });
    let mut buf = vec![0u8; COPY_CHUNK];
    let mut total_out = 0u64;
    loop {
        let n = decoder.read(&mut buf).context("decoding input")?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n]).context("writing output")?;
        total_out += n as u64;
    }
    writer.flush().context("flushing output")?;
    let total_in = decoder.into_inner().count;
    Ok((total_in, total_out))
}

/// Pass-through reader that counts the bytes it yields.
struct CountingReader<R: Read> {
    inner: R,
    count: u64,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}

/// Compress `src` into `dst`.  Returns `(bytes_in, bytes_out)`.
pub fn compress_file(src: &Path, dst: &Path, dict_size: DictSize) -> Result<(u64, u64)> {
    let fin = File::open(src).with_context(|| format!("opening {}", src.display()))?;
    let fout = File::create(dst).with_context(|| format!("creating {}", dst.display()))?;
    let mut reader = BufReader::new(fin);
    compress_stream(&mut reader, BufWriter::new(fout), dict_size)
}

/// Decompress `src` into `dst`.  Returns `(bytes_in, bytes_out)`.
pub fn decompress_file(src: &Path, dst: &Path) -> Result<(u64, u64)> {
    let fin = File::open(src).with_context(|| format!("opening {}", src.display()))?;
    let fout = File::create(dst).with_context(|| format!("creating {}", dst.display()))?;
    let mut writer = BufWriter::new(fout);
    decompress_stream(BufReader::new(fin), &mut writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_roundtrip_with_totals() {
        let input = b"round and round the rugged rock the ragged rascal ran".repeat(64);
        let mut compressed = Vec::new();
        let (cin, cout) =
            compress_stream(&mut &input[..], &mut compressed, DictSize::Size2K).unwrap();
        assert_eq!(cin, input.len() as u64);
        assert_eq!(cout, compressed.len() as u64);
        assert!(cout < cin);

        let mut out = Vec::new();
        let (din, dout) = decompress_stream(&compressed[..], &mut out).unwrap();
        assert_eq!(din, compressed.len() as u64);
        assert_eq!(dout, input.len() as u64);
        assert_eq!(out, input);
    }
}
