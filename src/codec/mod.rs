//! The DCL codec core: bit-packed I/O, sliding dictionaries, and the
//! compressor/decompressor state machines.

pub mod compress;
pub mod decompress;
pub mod tables;
pub mod types;

pub(crate) mod bitbuf;
pub(crate) mod dict;

pub use compress::Compressor;
pub use decompress::Decompressor;
pub use types::{CodecError, Coder, DictSize};
