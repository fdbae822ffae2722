//! Response body framing.
//!
//! Fixed-length bodies are written verbatim, so the only framing this module
//! implements is chunked transfer encoding:
//!
//! - [`ChunkedEncoder`]: frames data chunks and the terminating zero-length chunk
//!
//! Trailers following the last chunk are encoded with the header encoder.

mod chunked_encoder;

pub use chunked_encoder::Chunk;
pub use chunked_encoder::ChunkedEncoder;
