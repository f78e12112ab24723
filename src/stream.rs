//! Streaming wrappers: push/pull around any [`Coder`], plus `std::io`
//! adapters and the one-shot conveniences built on top of them.
//!
//! [`EncoderStream`] owns the staging between a codec and its consumer:
//! `push` feeds raw bytes through `update` into an internal buffer, `pull`
//! drains produced bytes, `finish` flushes the end-of-stream handling.
//! When a single `update` wants more room than staged, the stream retries
//! with a doubled slice — that loop is the whole backpressure story, since
//! the codecs themselves never block.

use std::io::{self, Read, Write};

use crate::codec::compress::Compressor;
use crate::codec::decompress::Decompressor;
use crate::codec::types::{CodecError, Coder, DictSize};

/// Default staging granularity for one `update` round.
const STAGING_CHUNK: usize = 32 * 1024;

/// How much compressed input an [`ExplodeReader`] requests per refill.
const READER_CHUNK: usize = 8 * 1024;

// ─────────────────────────────────────────────────────────────────────────────
// Core push/pull stream
// ─────────────────────────────────────────────────────────────────────────────

/// Byte-stream face of a [`Coder`]: push input, pull output, finish.
#[derive(Debug)]
pub struct EncoderStream<C: Coder> {
    coder: C,
    staged: Vec<u8>,
    read_pos: usize,
    finished: bool,
}

impl<C: Coder> EncoderStream<C> {
    pub fn new(coder: C) -> Self {
        Self {
            coder,
            staged: Vec::new(),
            read_pos: 0,
            finished: false,
        }
    }

    /// Feed input through the codec into the staging buffer.
    pub fn push(&mut self, input: &[u8]) -> Result<(), CodecError> {
        self.drive(input, false)
    }

    /// Signal end-of-input: flush pending state and (for a decompressing
    /// stream) verify clean termination.
    pub fn finish(&mut self) -> Result<(), CodecError> {
        self.drive(&[], true)?;
        self.finished = true;
        Ok(())
    }

    /// Copy staged output into `buf`; returns the number of bytes moved.
    pub fn pull(&mut self, buf: &mut [u8]) -> usize {
        let available = &self.staged[self.read_pos..];
        let n = buf.len().min(available.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.read_pos += n;
        self.compact();
        n
    }

    /// Bytes currently staged and unread.
    pub fn pending(&self) -> usize {
        self.staged.len() - self.read_pos
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Access the wrapped codec.
    pub fn coder(&self) -> &C {
        &self.coder
    }

    /// Tear down into the wrapped codec.
    pub fn into_coder(self) -> C {
        self.coder
    }

    fn compact(&mut self) {
        if self.read_pos == self.staged.len() {
            self.staged.clear();
            self.read_pos = 0;
        } else if self.read_pos >= STAGING_CHUNK {
            self.staged.drain(..self.read_pos);
            self.read_pos = 0;
        }
    }

    /// Run `update` rounds until the codec has nothing more to produce,
    /// growing the staging slice on demand.
    fn drive(&mut self, input: &[u8], flush: bool) -> Result<(), CodecError> {
        // 25% headroom covers the compressor's 9-bits-per-byte worst case
        // in one round; anything else grows geometrically below.
        let mut space = STAGING_CHUNK.max(input.len() + input.len() / 4 + 64);
        let mut src = input;
        loop {
            let valid = self.staged.len();
            self.staged.resize(valid + space, 0);
            match self.coder.update(src, &mut self.staged[valid..], flush) {
                Ok(written) => {
                    self.staged.truncate(valid + written);
                    src = &[];
                    if written < space {
                        return Ok(());
                    }
                    // Output slice ran full: there may be more.
                }
                Err(CodecError::OutputFull) => {
                    self.staged.truncate(valid);
                    space *= 2;
                }
                Err(e) => {
                    self.staged.truncate(valid);
                    return Err(e);
                }
            }
        }
    }
}

impl EncoderStream<Compressor> {
    /// Compressing stream with the given dictionary size.
    pub fn compressing(dict_size: DictSize) -> Self {
        Self::new(Compressor::new(dict_size))
    }
}

impl EncoderStream<Decompressor> {
    /// Decompressing stream; the header tells it everything else.
    pub fn decompressing() -> Self {
        Self::new(Decompressor::new())
    }
}

fn to_io_error(e: CodecError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}

// ─────────────────────────────────────────────────────────────────────────────
// io::Write adapter (compression)
// ─────────────────────────────────────────────────────────────────────────────

/// Compressing [`Write`] adapter: bytes written come out the far side as
/// a DCL stream.  Call [`finish`](Self::finish) to emit the end-of-stream
/// code and recover the inner writer; dropping an unfinished writer
/// finalizes on a best-effort basis.
pub struct ImplodeWriter<W: Write> {
    inner: Option<W>,
    stream: EncoderStream<Compressor>,
    total_in: u64,
    total_out: u64,
}

impl<W: Write> ImplodeWriter<W> {
    pub fn new(inner: W, dict_size: DictSize) -> Self {
        Self {
            inner: Some(inner),
            stream: EncoderStream::compressing(dict_size),
            total_in: 0,
            total_out: 0,
        }
    }

    /// Raw bytes accepted so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Compressed bytes handed to the inner writer so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    fn drain_staged(&mut self) -> io::Result<()> {
        let inner = self.inner.as_mut().expect("inner writer taken by finish");
        let mut buf = [0u8; 4096];
        loop {
            let n = self.stream.pull(&mut buf);
            if n == 0 {
                return Ok(());
            }
            inner.write_all(&buf[..n])?;
            self.total_out += n as u64;
        }
    }

    /// Flush the codec and return the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.finish_in_place()?;
        Ok(self.inner.take().expect("finish ran with inner writer present"))
    }

    fn finish_in_place(&mut self) -> io::Result<()> {
        if !self.stream.is_finished() {
            self.stream.finish().map_err(to_io_error)?;
            self.drain_staged()?;
            if let Some(inner) = self.inner.as_mut() {
                inner.flush()?;
            }
        }
        Ok(())
    }
}

impl<W: Write> Write for ImplodeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.push(buf).map_err(to_io_error)?;
        self.total_in += buf.len() as u64;
        self.drain_staged()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.drain_staged()?;
        self.inner
            .as_mut()
            .expect("inner writer taken by finish")
            .flush()
    }
}

impl<W: Write> Drop for ImplodeWriter<W> {
    fn drop(&mut self) {
        if self.inner.is_some() {
            let _ = self.finish_in_place();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// io::Read adapter (decompression)
// ─────────────────────────────────────────────────────────────────────────────

/// Decompressing [`Read`] adapter: reads decoded bytes, pulling and
/// decoding compressed bytes from the inner reader as needed.  A stream
/// that ends without its end-of-stream code, or with trailing data,
/// surfaces as `InvalidData`.
pub struct ExplodeReader<R: Read> {
    inner: R,
    stream: EncoderStream<Decompressor>,
    in_buf: Box<[u8]>,
    eof: bool,
}

impl<R: Read> ExplodeReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            stream: EncoderStream::decompressing(),
            in_buf: vec![0; READER_CHUNK].into_boxed_slice(),
            eof: false,
        }
    }

    /// Return the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for ExplodeReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            let n = self.stream.pull(buf);
            if n > 0 {
                return Ok(n);
            }
            if self.eof {
                return Ok(0);
            }
            let got = self.inner.read(&mut self.in_buf)?;
            if got == 0 {
                self.stream.finish().map_err(to_io_error)?;
                self.eof = true;
            } else {
                self.stream.push(&self.in_buf[..got]).map_err(to_io_error)?;
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// One-shot helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Compress a whole buffer into a fresh `Vec`.
pub fn compress_to_vec(input: &[u8], dict_size: DictSize) -> Vec<u8> {
    let mut c = Compressor::new(dict_size);
    let mut out = vec![0u8; c.max_output_bytes(input.len())];
    let n = c
        .update(input, &mut out, true)
        .expect("output sized by max_output_bytes");
    out.truncate(n);
    out
}

/// Decompress a whole buffer into a fresh `Vec`.
pub fn decompress_to_vec(input: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut stream = EncoderStream::decompressing();
    stream.push(input)?;
    stream.finish()?;
    let mut out = vec![0u8; stream.pending()];
    let n = stream.pull(&mut out);
    debug_assert_eq!(n, out.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_roundtrip() {
        let input = b"a man a plan a canal panama, a man a plan a canal panama";
        for size in [DictSize::Size1K, DictSize::Size2K, DictSize::Size4K] {
            let compressed = compress_to_vec(input, size);
            assert_eq!(decompress_to_vec(&compressed).unwrap(), input);
        }
    }

    #[test]
    fn push_pull_stream_roundtrip() {
        let input: Vec<u8> = (0..20_000u32).map(|i| (i * 31 % 251) as u8).collect();
        let mut enc = EncoderStream::compressing(DictSize::Size4K);
        for chunk in input.chunks(997) {
            enc.push(chunk).unwrap();
        }
        enc.finish().unwrap();
        let mut compressed = vec![0u8; enc.pending()];
        enc.pull(&mut compressed);

        let mut dec = EncoderStream::decompressing();
        for chunk in compressed.chunks(313) {
            dec.push(chunk).unwrap();
        }
        dec.finish().unwrap();
        let mut out = vec![0u8; dec.pending()];
        dec.pull(&mut out);
        assert_eq!(out, input);
    }

    #[test]
    fn writer_reader_adapters_roundtrip() {
        let input = b"So shaken as we are, so wan with care".repeat(40);
        let mut w = ImplodeWriter::new(Vec::new(), DictSize::Size2K);
        // One byte at a time to stress staging.
        for &b in &input {
            w.write_all(&[b]).unwrap();
        }
        let compressed = w.finish().unwrap();
        assert!(compressed.len() < input.len());

        let mut r = ExplodeReader::new(&compressed[..]);
        let mut out = Vec::new();
        r.read_to_end(&mut out).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn writer_tracks_totals() {
        let input = vec![0xABu8; 4096];
        let mut w = ImplodeWriter::new(Vec::new(), DictSize::Size1K);
        w.write_all(&input).unwrap();
        let (tin, _) = (w.total_in(), w.total_out());
        assert_eq!(tin, 4096);
        let compressed = w.finish().unwrap();
        assert!(!compressed.is_empty());
    }

    #[test]
    fn reader_surfaces_truncation() {
        let mut compressed = compress_to_vec(b"hello world", DictSize::Size2K);
        compressed.pop();
        compressed.pop();
        let mut r = ExplodeReader::new(&compressed[..]);
        let mut out = Vec::new();
        let err = r.read_to_end(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn decompress_rejects_garbage() {
        assert!(decompress_to_vec(&[0x09, 0x09, 0x01]).is_err());
    }
}
