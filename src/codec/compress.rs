//! Streaming DCL compressor.
//!
//! The compressor is a byte-at-a-time state machine.  Because the format's
//! shortest copy is effectively three bytes, up to two bytes ride in a
//! pending-literal buffer; the third byte triggers a hash-chain search.  A
//! found match then *absorbs* subsequent input as long as the dictionary
//! agrees, emitting nothing — the match, or the buffered literals, only
//! reach the bit stream when the run of agreement breaks, the 518-byte
//! ceiling is hit, or the caller flushes.
//!
//! Absorbed match bytes are never stored: they are, by construction, equal
//! to the dictionary bytes the match walked over, reading cyclically when
//! the match overlaps its own output exactly as the decoder's overlapped
//! copy will.  Committing a match replays that same copy into the
//! dictionary, so compressor and decompressor windows stay in lockstep.

use super::bitbuf::{BitSink, BitWriter, CountSink, SliceSink};
use super::dict::MatchDict;
use super::tables::{DIST_BITS, DIST_CODE, LEN_BASE, LEN_BITS, LEN_CODE, LEN_EXTRA};
use super::types::{CodecError, Coder, DictSize, HASH_MASK, MAX_MATCH, MIN_MATCH};

/// Inputs longer than this could overflow the 9-bits-per-byte worst-case
/// size computation on its way through `u64`; the bound saturates there.
const SIZE_BOUND_SATURATION: usize = 1_908_874_349;

// ─────────────────────────────────────────────────────────────────────────────
// Pending state
// ─────────────────────────────────────────────────────────────────────────────

/// Bytes absorbed but not yet represented in the bit stream.
///
/// `len <= 2`: `lits[..len]` holds raw pending literals.  `len >= 3`: a
/// candidate match; `index` is the ring position of the last matched byte
/// and `distance` the fixed back distance from the write cursor to the
/// match start.  `run` tracks whether every absorbed byte so far is one
/// repeated value (enabling the distance-1 re-anchor), and `hash` is the
/// 9-bit rolling hash of the most recent absorbed bytes.
#[derive(Debug, Clone, Default)]
struct Pending {
    len: usize,
    lits: [u8; 2],
    hash: u32,
    index: usize,
    distance: usize,
    run: Option<u8>,
}

impl Pending {
    fn clear(&mut self) {
        *self = Pending::default();
    }

    fn restart(&mut self, c: u8) {
        self.len = 1;
        self.lits[0] = c;
        self.hash = c as u32;
        self.run = Some(c);
        self.index = 0;
        self.distance = 0;
    }

    #[inline]
    fn roll_hash(&mut self, c: u8) {
        self.hash = ((self.hash << 3) ^ c as u32) & HASH_MASK;
    }

    #[inline]
    fn track_run(&mut self, c: u8) {
        if self.run != Some(c) {
            self.run = None;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Compressor
// ─────────────────────────────────────────────────────────────────────────────

/// Incremental DCL compressor.
///
/// Always emits fixed 8-bit literals (header byte 0 = 0); the dictionary
/// size is chosen at construction and fixed for the stream's lifetime.
///
/// ```
/// use pkdcl::{Coder, Compressor, DictSize};
///
/// let mut c = Compressor::new(DictSize::Size2K);
/// let input = b"abcabcabcabc";
/// let mut out = vec![0u8; c.max_output_bytes(input.len())];
/// let n = c.update(input, &mut out, true).unwrap();
/// assert!(n < input.len() + 4);
/// ```
#[derive(Debug, Clone)]
pub struct Compressor {
    dict: MatchDict,
    bits: BitWriter,
    pending: Pending,
    dict_size: DictSize,
    wrote_header: bool,
    finished: bool,
}

impl Compressor {
    /// Create a compressor with the given dictionary size.
    pub fn new(dict_size: DictSize) -> Self {
        Self {
            dict: MatchDict::new(dict_size.bytes()),
            bits: BitWriter::new(),
            pending: Pending::default(),
            dict_size,
            wrote_header: false,
            finished: false,
        }
    }

    /// Create a compressor from a raw dictionary byte count; anything but
    /// 1024, 2048, or 4096 is not expressible on the wire.
    pub fn with_dict_bytes(bytes: usize) -> Option<Self> {
        DictSize::from_bytes(bytes).map(Self::new)
    }

    /// Dictionary size this stream was created with.
    pub fn dict_size(&self) -> DictSize {
        self.dict_size
    }

    // ── Emission ──────────────────────────────────────────────────────────────

    fn emit_literal<S: BitSink>(&mut self, byte: u8, sink: &mut S) -> Result<(), CodecError> {
        self.bits.put(0, 1, sink)?;
        self.bits.put(byte as u32, 8, sink)?;
        self.dict.push(byte);
        Ok(())
    }

    fn write_length<S: BitSink>(&mut self, len: usize, sink: &mut S) -> Result<(), CodecError> {
        debug_assert!((2..=519).contains(&len));
        let sym = (0..16usize)
            .find(|&s| {
                let base = LEN_BASE[s] as usize;
                len >= base && len < base + (1usize << LEN_EXTRA[s])
            })
            .expect("2..=519 is fully covered by the length alphabet");
        self.bits.put(1, 1, sink)?;
        self.bits
            .put(LEN_CODE[sym] as u32, LEN_BITS[sym] as u32, sink)?;
        if LEN_EXTRA[sym] > 0 {
            let extra = len - LEN_BASE[sym] as usize;
            self.bits.put(extra as u32, LEN_EXTRA[sym] as u32, sink)?;
        }
        Ok(())
    }

    fn write_distance<S: BitSink>(
        &mut self,
        code: usize,
        len: usize,
        sink: &mut S,
    ) -> Result<(), CodecError> {
        let low_bits = if len == 2 { 2 } else { self.dict_size.low_bits() };
        let u = code >> low_bits;
        debug_assert!(u < 64);
        self.bits.put(DIST_CODE[u] as u32, DIST_BITS[u] as u32, sink)?;
        self.bits
            .put((code & ((1 << low_bits) - 1)) as u32, low_bits, sink)?;
        Ok(())
    }

    /// Emit the pending match and commit its bytes to the dictionary.
    fn emit_pending_match<S: BitSink>(&mut self, sink: &mut S) -> Result<(), CodecError> {
        let len = self.pending.len;
        let distance = self.pending.distance;
        debug_assert!(len >= MIN_MATCH && len <= MAX_MATCH);
        self.write_length(len, sink)?;
        self.write_distance(distance - 1, len, sink)?;
        self.dict.push_copy(distance, len);
        self.pending.clear();
        Ok(())
    }

    fn write_eos<S: BitSink>(&mut self, sink: &mut S) -> Result<(), CodecError> {
        self.write_length(519, sink)?;
        self.bits.pad_to_byte(sink)
    }

    // ── Match search ──────────────────────────────────────────────────────────

    /// First byte of a pending match in absorption order `k`.  The source
    /// cycles through the window span `[start, start + distance)` —
    /// identical to the decoder's overlapped copy.
    #[inline]
    fn pending_byte(&self, start: usize, k: usize) -> u8 {
        self.dict.at(start + (k % self.pending.distance))
    }

    /// Find a committed 3-byte occurrence of `a b c`, newest first.
    /// Returns the ring index of the `c` position.
    fn find_prefix(&self, h: usize, a: u8, b: u8, c: u8) -> Option<usize> {
        let size = self.dict.size();
        self.dict.chain(h).find(|&i| {
            self.dict.span_is_live(i, 3)
                && self.dict.at(i) == c
                && self.dict.at(i + size - 1) == b
                && self.dict.at(i + size - 2) == a
        })
    }

    /// After a mismatch: find a fully-committed occurrence of the whole
    /// pending content followed by `c`.  Returns the ring index of the `c`
    /// position.
    fn find_longer(&self, h: usize, c: u8) -> Option<usize> {
        let len = self.pending.len;
        let size = self.dict.size();
        let start = self.dict.pos_back(self.pending.distance);
        'chain: for j in self.dict.chain(h) {
            if !self.dict.span_is_live(j, len + 1) || self.dict.at(j) != c {
                continue;
            }
            for k in 0..len {
                if self.dict.at(j + size - 1 - k) != self.pending_byte(start, len - 1 - k) {
                    continue 'chain;
                }
            }
            return Some(j);
        }
        None
    }

    /// Adopt a match ending at ring index `end` covering the pending
    /// bytes plus `c`.
    fn adopt_match(&mut self, end: usize, new_len: usize, c: u8) {
        let size = self.dict.size();
        let start = (end + size - (new_len - 1)) & (size - 1);
        self.pending.index = end;
        self.pending.distance = self.dict.distance_to(start);
        self.pending.len = new_len;
        self.pending.track_run(c);
        self.pending.roll_hash(c);
    }

    // ── Absorption state machine ──────────────────────────────────────────────

    fn absorb<S: BitSink>(&mut self, c: u8, sink: &mut S) -> Result<(), CodecError> {
        match self.pending.len {
            0 => self.pending.restart(c),
            1 => {
                self.pending.lits[1] = c;
                self.pending.track_run(c);
                self.pending.roll_hash(c);
                self.pending.len = 2;
            }
            2 => self.search_initial(c, sink)?,
            _ => self.extend(c, sink)?,
        }
        Ok(())
    }

    /// Two literals pending plus the new byte `c`: look for a 3-byte match.
    fn search_initial<S: BitSink>(&mut self, c: u8, sink: &mut S) -> Result<(), CodecError> {
        let (a, b) = (self.pending.lits[0], self.pending.lits[1]);
        let h = (((self.pending.hash << 3) ^ c as u32) & HASH_MASK) as usize;
        if let Some(end) = self.find_prefix(h, a, b, c) {
            self.adopt_match(end, MIN_MATCH, c);
            self.pending.run = if a == b && b == c { Some(c) } else { None };
            return Ok(());
        }
        // Three equal bytes repeating the newest committed byte become a
        // distance-0 run match even without a chain hit.
        if a == b && b == c && self.dict.filled() >= 2 && self.dict.last_byte() == Some(c) {
            self.pending.index = self.dict.pos_back(1);
            self.pending.distance = 1;
            self.pending.len = MIN_MATCH;
            self.pending.run = Some(c);
            self.pending.roll_hash(c);
            return Ok(());
        }
        // No match: release the oldest pending byte and keep looking with
        // the window shifted one byte forward.
        self.emit_literal(a, sink)?;
        self.pending.lits[0] = b;
        self.pending.lits[1] = c;
        self.pending.hash = (((b as u32) << 3) ^ c as u32) & HASH_MASK;
        self.pending.run = if b == c { Some(c) } else { None };
        Ok(())
    }

    /// A match is pending: try to grow it by `c`, re-anchor or re-search
    /// on disagreement, emit if nothing longer exists.
    fn extend<S: BitSink>(&mut self, c: u8, sink: &mut S) -> Result<(), CodecError> {
        let wi = self.dict.write_index();
        let mut next = (self.pending.index + 1) & (self.dict.size() - 1);
        if next == wi {
            // The source caught up with the write cursor: wrap to the
            // match start, replaying the overlap.
            next = self.dict.pos_back(self.pending.distance);
        }
        if self.dict.at(next) == c {
            self.pending.index = next;
            self.pending.len += 1;
            self.pending.track_run(c);
            self.pending.roll_hash(c);
            return self.finish_if_max(sink);
        }
        self.on_mismatch(c, sink)
    }

    fn on_mismatch<S: BitSink>(&mut self, c: u8, sink: &mut S) -> Result<(), CodecError> {
        // A repeated-byte match that broke in the dictionary can continue
        // against the newest committed byte at distance 1, where it can
        // never break again while the input repeats.
        if self.pending.run == Some(c)
            && self.pending.distance != 1
            && self.dict.last_byte() == Some(c)
        {
            self.pending.index = self.dict.pos_back(1);
            self.pending.distance = 1;
            self.pending.len += 1;
            self.pending.roll_hash(c);
            return self.finish_if_max(sink);
        }
        // Otherwise re-walk the chain for an occurrence of the pending
        // content one byte longer.
        let h = (((self.pending.hash << 3) ^ c as u32) & HASH_MASK) as usize;
        if let Some(end) = self.find_longer(h, c) {
            let new_len = self.pending.len + 1;
            self.adopt_match(end, new_len, c);
            return self.finish_if_max(sink);
        }
        // Nothing longer: the pending match is as good as it gets.
        self.emit_pending_match(sink)?;
        self.pending.restart(c);
        Ok(())
    }

    fn finish_if_max<S: BitSink>(&mut self, sink: &mut S) -> Result<(), CodecError> {
        if self.pending.len == MAX_MATCH {
            self.emit_pending_match(sink)?;
        }
        Ok(())
    }

    // ── Driving ───────────────────────────────────────────────────────────────

    fn run_stream<S: BitSink>(
        &mut self,
        input: &[u8],
        sink: &mut S,
        flush: bool,
    ) -> Result<(), CodecError> {
        if self.finished {
            if input.is_empty() {
                return Ok(());
            }
            return Err(CodecError::InvalidData("stream already finished"));
        }
        if !self.wrote_header {
            sink.put_byte(0)?; // fixed 8-bit literals
            sink.put_byte(self.dict_size.selector())?;
            self.wrote_header = true;
        }
        for &c in input {
            self.absorb(c, sink)?;
        }
        if flush {
            match self.pending.len {
                0 => {}
                1 => {
                    let a = self.pending.lits[0];
                    self.emit_literal(a, sink)?;
                }
                2 => {
                    let (a, b) = (self.pending.lits[0], self.pending.lits[1]);
                    self.emit_literal(a, sink)?;
                    self.emit_literal(b, sink)?;
                }
                _ => self.emit_pending_match(sink)?,
            }
            self.pending.clear();
            self.write_eos(sink)?;
            self.finished = true;
        }
        Ok(())
    }
}

impl Coder for Compressor {
    /// Consume all of `input`; fail with `OutputFull` — before touching
    /// any state — when `output` cannot hold the produced bytes.  Size
    /// `output` with [`Coder::max_output_bytes`] to avoid the sizing
    /// simulation this otherwise runs.
    fn update(&mut self, input: &[u8], output: &mut [u8], flush: bool) -> Result<usize, CodecError> {
        if output.len() < self.max_output_bytes(input.len()) {
            let exact = self.simulate(input, flush)?;
            if exact > output.len() {
                return Err(CodecError::OutputFull);
            }
        }
        let mut sink = SliceSink::new(output);
        self.run_stream(input, &mut sink, flush)?;
        Ok(sink.written())
    }

    /// Run the real emission path against a cloned dictionary and a
    /// counting sink; the returned length is exact by construction.
    fn simulate(&self, input: &[u8], flush: bool) -> Result<usize, CodecError> {
        let mut shadow = self.clone();
        let mut sink = CountSink::default();
        shadow.run_stream(input, &mut sink, flush)?;
        Ok(sink.written())
    }

    /// Worst case is all-literal output: 9 bits per input byte, plus the
    /// 16-bit header, 16-bit end-of-stream code, any resident bits, and
    /// padding.
    fn max_output_bytes(&self, input_len: usize) -> usize {
        if input_len > SIZE_BOUND_SATURATION {
            return usize::MAX;
        }
        let bits = 9 * input_len as u64 + 39 + self.bits.pending_bits() as u64;
        usize::try_from((bits + 7) / 8).unwrap_or(usize::MAX)
    }

    fn reset(&mut self) {
        self.dict.reset();
        self.bits.reset();
        self.pending.clear();
        self.wrote_header = false;
        self.finished = false;
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compress_all(input: &[u8], size: DictSize, flush: bool) -> Vec<u8> {
        let mut c = Compressor::new(size);
        let mut out = vec![0u8; c.max_output_bytes(input.len())];
        let n = c.update(input, &mut out, flush).unwrap();
        out.truncate(n);
        out
    }

    #[test]
    fn empty_input_is_header_plus_eos() {
        assert_eq!(compress_all(b"", DictSize::Size2K, true), [0x00, 0x05, 0x01, 0xFF]);
        assert_eq!(compress_all(b"", DictSize::Size1K, true), [0x00, 0x04, 0x01, 0xFF]);
        assert_eq!(compress_all(b"", DictSize::Size4K, true), [0x00, 0x06, 0x01, 0xFF]);
    }

    #[test]
    fn three_literals_bit_exact() {
        // "AAA" -> header, three 9-bit literal codes (0 flag + 0x41), EOS.
        let out = compress_all(b"AAA", DictSize::Size2K, true);
        assert_eq!(out, [0x00, 0x05, 0x82, 0x04, 0x09, 0x0A, 0xF8, 0x07]);
    }

    #[test]
    fn abcabc_emits_back_reference() {
        // Three literals A B C, then a length-3 match at distance code 2.
        let out = compress_all(b"ABCABC", DictSize::Size2K, true);
        assert_eq!(out, [0x00, 0x05, 0x82, 0x08, 0x19, 0xFA, 0x22, 0xE0, 0x1F]);
    }

    #[test]
    fn aaaaa_uses_two_literals_and_a_run_match() {
        // 5×'A': literal, literal, then a distance-0 match of length 3
        // (bits: flag 1, length code 11, distance code 11 + 00000).
        let out = compress_all(b"AAAAA", DictSize::Size2K, true);
        assert_eq!(out, [0x00, 0x05, 0x82, 0x04, 0x7D, 0x10, 0xF0, 0x0F]);
    }

    #[test]
    fn simulate_matches_update_exactly() {
        let inputs: &[&[u8]] = &[
            b"",
            b"x",
            b"to be or not to be, that is the question",
            &[0u8; 1000],
            b"abcabcabcabcabcabcabcabc",
        ];
        for &input in inputs {
            for flush in [false, true] {
                let c = Compressor::new(DictSize::Size1K);
                let predicted = c.simulate(input, flush).unwrap();
                let mut real = c.clone();
                let mut out = vec![0u8; real.max_output_bytes(input.len())];
                let n = real.update(input, &mut out, flush).unwrap();
                assert_eq!(predicted, n, "input {:?} flush {flush}", &input[..input.len().min(16)]);
            }
        }
    }

    #[test]
    fn split_updates_equal_one_shot() {
        let input = b"she sells sea shells by the sea shore, she sells sea shells";
        let whole = compress_all(input, DictSize::Size2K, true);
        for k in 0..=input.len() {
            let mut c = Compressor::new(DictSize::Size2K);
            let mut out = vec![0u8; c.max_output_bytes(input.len())];
            let n1 = c.update(&input[..k], &mut out, false).unwrap();
            let n2 = c.update(&input[k..], &mut out[n1..], true).unwrap();
            assert_eq!(whole, out[..n1 + n2], "split at {k}");
        }
    }

    #[test]
    fn output_full_preserves_state() {
        let input = b"hello hello hello";
        let mut c = Compressor::new(DictSize::Size2K);
        let mut tiny = [0u8; 2];
        assert_eq!(c.update(input, &mut tiny, true), Err(CodecError::OutputFull));
        // Same instance still produces the pristine one-shot stream.
        let mut out = vec![0u8; c.max_output_bytes(input.len())];
        let n = c.update(input, &mut out, true).unwrap();
        assert_eq!(out[..n], compress_all(input, DictSize::Size2K, true)[..]);
    }

    #[test]
    fn update_after_finish_is_rejected() {
        let mut c = Compressor::new(DictSize::Size2K);
        let mut out = [0u8; 64];
        c.update(b"abc", &mut out, true).unwrap();
        assert!(c.is_finished());
        assert_eq!(c.update(&[], &mut out, true), Ok(0));
        assert_eq!(
            c.update(b"more", &mut out, false),
            Err(CodecError::InvalidData("stream already finished"))
        );
        c.reset();
        assert!(!c.is_finished());
        assert!(c.update(b"abc", &mut out, true).is_ok());
    }

    #[test]
    fn max_match_is_emitted_and_chained() {
        // 2 literals + one 518 match + continuation for 600 identical bytes.
        let input = vec![0x55u8; 600];
        let mut c = Compressor::new(DictSize::Size1K);
        let mut out = vec![0u8; c.max_output_bytes(input.len())];
        let n = c.update(&input, &mut out, true).unwrap();
        // far smaller than the literal encoding
        assert!(n < 16, "run compressed to {n} bytes");
    }

    #[test]
    fn max_output_bytes_formula() {
        let c = Compressor::new(DictSize::Size2K);
        assert_eq!(c.max_output_bytes(0), (39 + 7) / 8);
        assert_eq!(c.max_output_bytes(1), (9 + 39 + 7) / 8);
        assert_eq!(c.max_output_bytes(usize::MAX), usize::MAX);
    }
}
