// pkdcl — PKWare DCL "implode" stream codec, pure Rust

pub mod cli;
pub mod codec;
pub mod file;
pub mod stream;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level convenience re-exports for the most common API entry points.
// ─────────────────────────────────────────────────────────────────────────────

/// Incremental compressor over a 1/2/4 KiB sliding dictionary.
pub use codec::compress::Compressor;
/// Incremental decompressor; learns everything from the stream header.
pub use codec::decompress::Decompressor;
/// Error taxonomy shared by both codec halves.
pub use codec::types::CodecError;
/// The incremental-coder contract (`update` / `simulate` / `reset`).
pub use codec::types::Coder;
/// Legal dictionary sizes (1, 2, or 4 KiB).
pub use codec::types::DictSize;

/// Push/pull streaming wrapper over either codec half.
pub use stream::EncoderStream;
/// Decompressing [`std::io::Read`] adapter.
pub use stream::ExplodeReader;
/// Compressing [`std::io::Write`] adapter.
pub use stream::ImplodeWriter;

/// One-shot buffer compression.
pub use stream::compress_to_vec;
/// One-shot buffer decompression.
pub use stream::decompress_to_vec;

/// File-to-file helpers used by the CLI.
pub use file::{compress_file, decompress_file};

// ─────────────────────────────────────────────────────────────────────────────
// Version API
// ─────────────────────────────────────────────────────────────────────────────

pub const PKDCL_VERSION_MAJOR: i32 = 0;
pub const PKDCL_VERSION_MINOR: i32 = 1;
pub const PKDCL_VERSION_RELEASE: i32 = 0;
pub const PKDCL_VERSION_STRING: &str = "0.1.0";

/// Returns the library version string (e.g. `"0.1.0"`).
pub fn version_string() -> &'static str {
    PKDCL_VERSION_STRING
}
