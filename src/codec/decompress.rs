//! Streaming DCL decompressor.
//!
//! Decoding is a small state machine driven entirely by the bit buffer:
//!
//! ```text
//! Start ──header──▶ Ready ──flag 1──▶ Length ──▶ Copying ──▶ Ready
//!                     │ ▲                                      │
//!                     └─┴──flag 0: one literal─────────────────┘
//!                   Ready ──length 519──▶ End
//! ```
//!
//! Every decode step peeks first and consumes only once the whole item is
//! resolvable, so running out of input mid-code suspends cleanly: the
//! un-decoded bits stay buffered and the next `update` call resumes at the
//! same state.  Unprocessed compressed bytes are staged internally, which
//! is what makes arbitrarily fragmented input equivalent to a single call.
//! A match copy that outgrows the caller's output slice parks in
//! `Copying` and resumes on the next call the same way.

use super::bitbuf::BitReader;
use super::dict::WindowDict;
use super::tables::{
    DIST_BITS, DIST_DECODE, LEN_BASE, LEN_BITS, LEN_DECODE, LEN_EXTRA, LIT_COUNT, LIT_SHORT,
    LIT_SYMBOL, MAX_CODE_BITS,
};
use super::types::{CodecError, Coder, DictSize, EOS_LENGTH, SHORT_DIST_LOW_BITS};

/// Decode states.  `Length` holds a decoded copy length awaiting its
/// distance; `Copying` holds a partially-delivered copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Start,
    Ready,
    Length {
        len: u16,
    },
    Copying {
        distance: u16,
        remaining: u16,
    },
    End,
}

/// Incremental DCL decompressor.
///
/// Accepts both literal modes and all three dictionary sizes; everything
/// about the stream is learned from its two-byte header.
///
/// ```
/// use pkdcl::{Coder, Decompressor};
///
/// let mut d = Decompressor::new();
/// let mut out = [0u8; 16];
/// let n = d.update(&[0x00, 0x05, 0x01, 0xFF], &mut out, true).unwrap();
/// assert_eq!(n, 0); // empty stream
/// ```
#[derive(Debug, Clone, Default)]
pub struct Decompressor {
    bits: BitReader,
    staged: Vec<u8>,
    pos: usize,
    state: State,
    window: WindowDict,
    dict_size: Option<DictSize>,
    fixed_literals: bool,
}

impl Decompressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dictionary size announced by the stream header, once decoded.
    pub fn dict_size(&self) -> Option<DictSize> {
        self.dict_size
    }

    // ── Peeking decoders ──────────────────────────────────────────────────────
    //
    // Each returns the decoded item plus the total bits to consume, or
    // `None` when the buffered bits cannot resolve it yet.  The direct
    // lookup tables are indexed with zero-filled high bits; an entry is
    // only trusted when its code length is covered by buffered bits, which
    // prefix-freeness makes sufficient.

    /// Literal after a 0 flag: `(byte, code bits after the flag)`.
    fn peek_literal(&self) -> Option<(u8, u32)> {
        let avail = self.bits.available();
        if avail < 1 {
            return None;
        }
        if self.fixed_literals {
            return (avail >= 9).then(|| ((self.bits.peek_all() >> 1) as u8, 8));
        }
        let rest = self.bits.peek_all() >> 1;
        let avail_rest = avail - 1;
        if avail_rest >= 6 {
            let entry = LIT_SHORT[(rest & 0x3F) as usize];
            if entry != 0xFFFF {
                return Some((entry as u8, (entry >> 8) as u32));
            }
        }
        // Long codes resolve by walking the canonical code, shortest
        // length first, with the wire bits complemented.
        let mut code = 0usize;
        let mut first = 0usize;
        let mut index = 0usize;
        for l in 1..=MAX_CODE_BITS {
            if avail_rest < l {
                return None;
            }
            code |= (((rest >> (l - 1)) & 1) ^ 1) as usize;
            let count = LIT_COUNT[l as usize] as usize;
            if code < first + count {
                return Some((LIT_SYMBOL[index + (code - first)], l));
            }
            index += count;
            first = (first + count) << 1;
            code <<= 1;
        }
        // The literal alphabet is complete; 13 bits always resolve.
        unreachable!("literal code walk exhausted a complete code set")
    }

    /// Copy length after a 1 flag: `(length, total bits incl. flag)`.
    fn peek_length(&self) -> Option<(u16, u32)> {
        let avail = self.bits.available();
        if avail < 1 {
            return None;
        }
        let rest = self.bits.peek_all() >> 1;
        let avail_rest = avail - 1;
        let sym = LEN_DECODE[(rest & 0x7F) as usize] as usize;
        let nb = LEN_BITS[sym] as u32;
        let ex = LEN_EXTRA[sym] as u32;
        if nb + ex > avail_rest {
            return None;
        }
        let extra = (rest >> nb) & ((1u32 << ex) - 1);
        Some((LEN_BASE[sym] + extra as u16, 1 + nb + ex))
    }

    /// Distance code: `(zero-based distance, bits consumed)`.
    fn peek_distance(&self, low_bits: u32) -> Option<(u32, u32)> {
        let all = self.bits.peek_all();
        let sym = DIST_DECODE[(all & 0xFF) as usize] as usize;
        let nb = DIST_BITS[sym] as u32;
        if nb + low_bits > self.bits.available() {
            return None;
        }
        let low = (all >> nb) & ((1u32 << low_bits) - 1);
        Some((((sym as u32) << low_bits) | low, nb + low_bits))
    }

    // ── Decode loop ───────────────────────────────────────────────────────────

    fn decode_into(&mut self, output: &mut [u8]) -> Result<(usize, bool), CodecError> {
        let mut written = 0usize;
        let mut out_full = false;
        loop {
            self.bits.refill(&self.staged, &mut self.pos);
            match self.state {
                State::Start => {
                    if self.bits.available() < 16 {
                        break;
                    }
                    let mode = self.bits.take(8) as u8;
                    let selector = self.bits.take(8) as u8;
                    let size = match DictSize::from_selector(selector) {
                        Some(size) if mode <= 1 => size,
                        _ => return Err(CodecError::InvalidHeader { mode, selector }),
                    };
                    self.fixed_literals = mode == 0;
                    self.dict_size = Some(size);
                    self.window.init(size.bytes());
                    self.state = State::Ready;
                }
                State::Ready => {
                    if self.bits.available() < 1 {
                        break;
                    }
                    if self.bits.peek(1) == 1 {
                        let Some((len, used)) = self.peek_length() else {
                            break;
                        };
                        self.bits.consume(used);
                        if len == EOS_LENGTH {
                            self.state = State::End;
                        } else {
                            self.state = State::Length { len };
                        }
                    } else {
                        let Some((byte, code_bits)) = self.peek_literal() else {
                            break;
                        };
                        if written == output.len() {
                            out_full = true;
                            break;
                        }
                        self.bits.consume(1 + code_bits);
                        self.window.push(byte);
                        output[written] = byte;
                        written += 1;
                    }
                }
                State::Length { len } => {
                    let low_bits = if len == 2 {
                        SHORT_DIST_LOW_BITS
                    } else {
                        self.dict_size.map(DictSize::low_bits).unwrap_or(0)
                    };
                    let Some((code, used)) = self.peek_distance(low_bits) else {
                        break;
                    };
                    if code as usize >= self.window.filled() {
                        return Err(CodecError::InvalidData("copy distance exceeds window"));
                    }
                    self.bits.consume(used);
                    self.state = State::Copying {
                        distance: code as u16 + 1,
                        remaining: len,
                    };
                }
                State::Copying {
                    distance,
                    remaining,
                } => {
                    let space = output.len() - written;
                    let n = space.min(remaining as usize);
                    for _ in 0..n {
                        let byte = self.window.read_back(distance as usize);
                        self.window.push(byte);
                        output[written] = byte;
                        written += 1;
                    }
                    if n == remaining as usize {
                        self.state = State::Ready;
                    } else {
                        self.state = State::Copying {
                            distance,
                            remaining: remaining - n as u16,
                        };
                        out_full = true;
                        break;
                    }
                }
                State::End => break,
            }
        }
        // Drop the consumed prefix of the staging buffer.
        if self.pos > 0 {
            self.staged.drain(..self.pos);
            self.pos = 0;
        }
        Ok((written, out_full))
    }
}

impl Coder for Decompressor {
    /// Consume all of `input` (staging what cannot be decoded yet) and
    /// write decoded bytes into `output`.  A full `output` suspends the
    /// decoder; call again — with empty input if need be — to continue.
    /// With `flush`, verifies the stream terminated cleanly once all
    /// output has been delivered.
    fn update(&mut self, input: &[u8], output: &mut [u8], flush: bool) -> Result<usize, CodecError> {
        if !input.is_empty() {
            self.staged.extend_from_slice(input);
        }
        let (written, out_full) = self.decode_into(output)?;
        if out_full {
            if written == 0 {
                return Err(CodecError::OutputFull);
            }
            return Ok(written);
        }
        if flush {
            if self.state != State::End {
                return Err(CodecError::Truncated);
            }
            if self.bits.available() > 7 || self.pos < self.staged.len() {
                return Err(CodecError::TrailingBytes);
            }
        }
        Ok(written)
    }

    /// Decode a snapshot to measure output; quadratic-free because the
    /// scratch buffer drains in fixed-size steps.
    fn simulate(&self, input: &[u8], flush: bool) -> Result<usize, CodecError> {
        let mut shadow = self.clone();
        let mut scratch = [0u8; 4096];
        let mut total = 0usize;
        let mut n = shadow.update(input, &mut scratch, false)?;
        total += n;
        while n == scratch.len() {
            n = shadow.update(&[], &mut scratch, false)?;
            total += n;
        }
        if flush {
            total += shadow.update(&[], &mut scratch, true)?;
        }
        Ok(total)
    }

    /// Loose bound: the densest copy spends ~22 bits for 518 bytes, so
    /// one input byte can expand to a bit under 189 output bytes, plus one
    /// partial copy already in flight.
    fn max_output_bytes(&self, input_len: usize) -> usize {
        input_len
            .saturating_mul(189)
            .saturating_add(518)
    }

    fn reset(&mut self) {
        self.bits.reset();
        self.staged.clear();
        self.pos = 0;
        self.state = State::Start;
        self.window.reset();
        self.dict_size = None;
        self.fixed_literals = false;
    }

    fn is_finished(&self) -> bool {
        self.state == State::End
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(stream: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut d = Decompressor::new();
        let mut out = vec![0u8; d.max_output_bytes(stream.len())];
        let n = d.update(stream, &mut out, true)?;
        out.truncate(n);
        Ok(out)
    }

    #[test]
    fn empty_stream() {
        assert_eq!(decode_all(&[0x00, 0x05, 0x01, 0xFF]).unwrap(), b"");
    }

    #[test]
    fn three_fixed_literals() {
        let stream = [0x00, 0x05, 0x82, 0x04, 0x09, 0x0A, 0xF8, 0x07];
        assert_eq!(decode_all(&stream).unwrap(), b"AAA");
    }

    #[test]
    fn literal_plus_match() {
        let stream = [0x00, 0x05, 0x82, 0x08, 0x19, 0xFA, 0x22, 0xE0, 0x1F];
        assert_eq!(decode_all(&stream).unwrap(), b"ABCABC");
    }

    #[test]
    fn distance_zero_run() {
        let stream = [0x00, 0x05, 0x82, 0x04, 0x7D, 0x10, 0xF0, 0x0F];
        assert_eq!(decode_all(&stream).unwrap(), b"AAAAA");
    }

    /// This encoder never emits two-byte copies, but the format has them
    /// (2 low distance bits instead of the selector).
    #[test]
    fn two_byte_match_decodes() {
        let stream = [0x00, 0x05, 0xC2, 0x88, 0xED, 0x05, 0xFC, 0x03];
        assert_eq!(decode_all(&stream).unwrap(), b"abab");
    }

    #[test]
    fn variable_literal_mode() {
        let stream = [
            0x01, 0x05, 0x50, 0x6C, 0xD3, 0xD4, 0xF1, 0x3D, 0x64, 0x5D, 0x33, 0xE9, 0xA0, 0xF4,
            0x7D, 0x0B, 0xF8, 0x07,
        ];
        assert_eq!(decode_all(&stream).unwrap(), b"Hello, World! Hello");
    }

    /// One literal from each code-length tier: the 4-bit space, a 5-bit
    /// common letter, and 13-bit rare bytes.
    #[test]
    fn variable_literal_tiers() {
        let stream = [0x01, 0x05, 0xDE, 0x06, 0x00, 0x41, 0x52, 0x1C, 0xF0, 0x0F];
        assert_eq!(decode_all(&stream).unwrap(), [0x20, 0x65, 0xFE, 0x00, 0x41]);
    }

    #[test]
    fn max_length_run_via_distance_zero() {
        // Two literals then a 516-byte distance-0 copy.
        let stream = [0x00, 0x05, 0x6E, 0xDC, 0x04, 0xF0, 0x0F, 0x02, 0xFE, 0x01];
        let out = decode_all(&stream).unwrap();
        assert_eq!(out.len(), 518);
        assert!(out.iter().all(|&b| b == 0x37));
    }

    #[test]
    fn rejects_bad_header() {
        let mut d = Decompressor::new();
        let mut out = [0u8; 8];
        assert_eq!(
            d.update(&[0x02, 0x05, 0x01, 0xFF], &mut out, true),
            Err(CodecError::InvalidHeader { mode: 2, selector: 5 })
        );
        let mut d = Decompressor::new();
        assert_eq!(
            d.update(&[0x00, 0x07, 0x01, 0xFF], &mut out, true),
            Err(CodecError::InvalidHeader { mode: 0, selector: 7 })
        );
    }

    #[test]
    fn rejects_far_distance() {
        // One literal, then a length-3 copy from distance code 5.
        let stream = [0x00, 0x05, 0x82, 0x7E, 0x09, 0xF8, 0x07];
        assert_eq!(
            decode_all(&stream),
            Err(CodecError::InvalidData("copy distance exceeds window"))
        );
    }

    #[test]
    fn reports_truncation_only_on_flush() {
        let stream = [0x00, 0x05, 0x82, 0x00]; // literal, then silence
        let mut d = Decompressor::new();
        let mut out = [0u8; 8];
        let n = d.update(&stream, &mut out, false).unwrap();
        assert_eq!(&out[..n], b"A");
        assert_eq!(d.update(&[], &mut out, true), Err(CodecError::Truncated));
    }

    #[test]
    fn rejects_trailing_bytes() {
        let stream = [0x00, 0x05, 0x01, 0xFF, 0x00, 0x00];
        assert_eq!(decode_all(&stream), Err(CodecError::TrailingBytes));
    }

    #[test]
    fn fragmented_input_is_equivalent() {
        // Compressible synthetic stream: "Hello, World! Hello".
        let stream = [
            0x01u8, 0x05, 0x50, 0x6C, 0xD3, 0xD4, 0xF1, 0x3D, 0x64, 0x5D, 0x33, 0xE9, 0xA0, 0xF4,
            0x7D, 0x0B, 0xF8, 0x07,
        ];
        for chunk in [1usize, 2, 3, 7] {
            let mut d = Decompressor::new();
            let mut out = vec![0u8; 64];
            let mut written = 0;
            let mut iter = stream.chunks(chunk).peekable();
            while let Some(part) = iter.next() {
                let last = iter.peek().is_none();
                written += d.update(part, &mut out[written..], last).unwrap();
            }
            assert_eq!(&out[..written], b"Hello, World! Hello", "chunk {chunk}");
        }
    }

    #[test]
    fn suspends_and_resumes_on_full_output() {
        // 518-byte run delivered through a 10-byte window.
        let stream = [0x00, 0x05, 0x6E, 0xDC, 0x04, 0xF0, 0x0F, 0x02, 0xFE, 0x01];
        let mut d = Decompressor::new();
        let mut total = Vec::new();
        let mut buf = [0u8; 10];
        let mut n = d.update(&stream, &mut buf, false).unwrap();
        total.extend_from_slice(&buf[..n]);
        while n == buf.len() {
            n = d.update(&[], &mut buf, false).unwrap();
            total.extend_from_slice(&buf[..n]);
        }
        d.update(&[], &mut buf, true).unwrap();
        assert_eq!(total.len(), 518);
        assert!(total.iter().all(|&b| b == 0x37));
    }

    #[test]
    fn output_full_on_zero_progress() {
        let stream = [0x00, 0x05, 0x82, 0x04, 0x09, 0x0A, 0xF8, 0x07];
        let mut d = Decompressor::new();
        let mut empty: [u8; 0] = [];
        assert_eq!(d.update(&stream, &mut empty, false), Err(CodecError::OutputFull));
        // State kept: a real buffer now gets everything.
        let mut out = [0u8; 8];
        let n = d.update(&[], &mut out, true).unwrap();
        assert_eq!(&out[..n], b"AAA");
    }

    #[test]
    fn simulate_matches_update() {
        let stream = [0x00, 0x05, 0x6E, 0xDC, 0x04, 0xF0, 0x0F, 0x02, 0xFE, 0x01];
        let d = Decompressor::new();
        assert_eq!(d.simulate(&stream, true).unwrap(), 518);
    }

    #[test]
    fn reset_reuses_allocations() {
        let mut d = Decompressor::new();
        let mut out = [0u8; 16];
        d.update(&[0x00, 0x05, 0x01, 0xFF], &mut out, true).unwrap();
        assert!(d.is_finished());
        d.reset();
        assert!(!d.is_finished());
        let n = d
            .update(&[0x00, 0x04, 0x82, 0x04, 0x09, 0x0A, 0xF8, 0x07], &mut out, true)
            .unwrap();
        assert_eq!(&out[..n], b"AAA");
    }
}
