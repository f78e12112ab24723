//! Shared codec types: dictionary sizing, the error taxonomy, and the
//! incremental-coder contract implemented by both halves of the codec.
//!
//! The PKWare DCL stream format fixes everything here: the three legal
//! dictionary sizes (1/2/4 KiB, wire selectors 4/5/6), the two literal
//! modes, and the failure modes a conforming decoder can hit.

use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Format constants
// ─────────────────────────────────────────────────────────────────────────────

/// Shortest match the compressor will emit.  Two-byte matches exist in the
/// wire format but never beat two literals at this encoder's code lengths,
/// so only the decoder supports them.
pub const MIN_MATCH: usize = 3;

/// Longest encodable copy.  Length 519 is expressible but reserved as the
/// end-of-stream marker.
pub const MAX_MATCH: usize = 518;

/// Length value reserved for the end-of-stream code.
pub const EOS_LENGTH: u16 = 519;

/// Number of rolling-hash buckets in the compressor's head table.
pub const HASH_SIZE: usize = 512;

/// Mask for the 9-bit rolling hash `((a << 6) ^ (b << 3) ^ c) & 0x1FF`.
pub const HASH_MASK: u32 = 0x1FF;

/// Number of raw low bits in a distance code for two-byte copies.
pub const SHORT_DIST_LOW_BITS: u32 = 2;

// ─────────────────────────────────────────────────────────────────────────────
// Dictionary size
// ─────────────────────────────────────────────────────────────────────────────

/// Sliding-dictionary size.  The wire format can only express these three;
/// anything else is rejected at construction and on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DictSize {
    /// 1 KiB window, wire selector 4.
    Size1K = 1024,
    /// 2 KiB window, wire selector 5.
    #[default]
    Size2K = 2048,
    /// 4 KiB window, wire selector 6.
    Size4K = 4096,
}

impl DictSize {
    /// Window size in bytes (`64 << selector`).
    #[inline]
    pub fn bytes(self) -> usize {
        self as usize
    }

    /// Selector byte written at offset 1 of the stream: 4, 5, or 6.
    #[inline]
    pub fn selector(self) -> u8 {
        match self {
            DictSize::Size1K => 4,
            DictSize::Size2K => 5,
            DictSize::Size4K => 6,
        }
    }

    /// Number of raw low bits carried by each distance code.
    #[inline]
    pub fn low_bits(self) -> u32 {
        self.selector() as u32
    }

    /// Parse the selector byte of a stream header.
    pub fn from_selector(selector: u8) -> Option<Self> {
        match selector {
            4 => Some(DictSize::Size1K),
            5 => Some(DictSize::Size2K),
            6 => Some(DictSize::Size4K),
            _ => None,
        }
    }

    /// Validate a byte count supplied by a caller.
    pub fn from_bytes(bytes: usize) -> Option<Self> {
        match bytes {
            1024 => Some(DictSize::Size1K),
            2048 => Some(DictSize::Size2K),
            4096 => Some(DictSize::Size4K),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Codec failure taxonomy.
///
/// `OutputFull` is the only recoverable variant: the instance keeps its
/// state and the caller retries with more output capacity.  Every other
/// variant is terminal for the stream that produced it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// The caller's output buffer cannot hold the bytes this call must
    /// produce.  State is unchanged (compressor) or fully preserved for a
    /// retry (decompressor).
    #[error("output buffer too small for the produced data")]
    OutputFull,

    /// The two-byte stream header is malformed: literal mode must be 0 or
    /// 1 and the dictionary selector 4, 5, or 6.
    #[error("invalid stream header (literal mode {mode}, dictionary selector {selector})")]
    InvalidHeader { mode: u8, selector: u8 },

    /// The bit stream decoded to something impossible, e.g. a copy
    /// distance reaching past the bytes decoded so far.
    #[error("invalid compressed data: {0}")]
    InvalidData(&'static str),

    /// End of input reached before the end-of-stream code.
    #[error("compressed stream truncated before the end-of-stream code")]
    Truncated,

    /// More than seven bits of payload remained after the end-of-stream
    /// code; a conforming stream ends within the padded final byte.
    #[error("trailing data after the end-of-stream code")]
    TrailingBytes,
}

// ─────────────────────────────────────────────────────────────────────────────
// Incremental coder contract
// ─────────────────────────────────────────────────────────────────────────────

/// The incremental byte-transform contract shared by [`Compressor`] and
/// [`Decompressor`].  [`EncoderStream`] drives either through this trait.
///
/// [`Compressor`]: crate::codec::compress::Compressor
/// [`Decompressor`]: crate::codec::decompress::Decompressor
/// [`EncoderStream`]: crate::stream::EncoderStream
pub trait Coder {
    /// Consume all of `input`, write produced bytes into `output`, and
    /// return the number written.  `flush` marks end-of-input: the
    /// compressor emits its pending bytes plus the end-of-stream code; the
    /// decompressor verifies the stream actually ended.
    fn update(&mut self, input: &[u8], output: &mut [u8], flush: bool)
        -> Result<usize, CodecError>;

    /// Exact number of bytes `update` would produce for `input` and
    /// `flush`, computed against a snapshot without touching real state.
    fn simulate(&self, input: &[u8], flush: bool) -> Result<usize, CodecError>;

    /// Upper bound on the output of a single `update` over `input_len`
    /// bytes, given the current internal state.
    fn max_output_bytes(&self, input_len: usize) -> usize;

    /// Return to the freshly-constructed state, keeping allocations.
    fn reset(&mut self);

    /// `true` once a flushed stream has been completed.
    fn is_finished(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dict_size_wire_mapping() {
        assert_eq!(DictSize::Size1K.selector(), 4);
        assert_eq!(DictSize::Size2K.selector(), 5);
        assert_eq!(DictSize::Size4K.selector(), 6);
        for s in [DictSize::Size1K, DictSize::Size2K, DictSize::Size4K] {
            assert_eq!(s.bytes(), 64 << s.selector());
            assert_eq!(DictSize::from_selector(s.selector()), Some(s));
            assert_eq!(DictSize::from_bytes(s.bytes()), Some(s));
        }
        assert_eq!(DictSize::from_selector(7), None);
        assert_eq!(DictSize::from_bytes(512), None);
        assert_eq!(DictSize::from_bytes(8192), None);
    }

    #[test]
    fn error_display_names_are_stable() {
        assert_eq!(
            CodecError::OutputFull.to_string(),
            "output buffer too small for the produced data"
        );
        assert_eq!(
            CodecError::InvalidHeader { mode: 2, selector: 9 }.to_string(),
            "invalid stream header (literal mode 2, dictionary selector 9)"
        );
        assert!(CodecError::InvalidData("copy distance exceeds window")
            .to_string()
            .contains("copy distance"));
    }
}
