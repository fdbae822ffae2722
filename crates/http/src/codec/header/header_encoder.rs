//! Serializes a header block (response headers or trailers).
//!
//! Each entry becomes a `key: value\r\n` line in the map's iteration order and the
//! block is closed by a blank `\r\n` line. Keys are written as stored, which for
//! [`Headers`] means lowercase.

use crate::protocol::{Headers, WriteError};

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

/// Initial buffer size reserved per header line
const INIT_LINE_SIZE: usize = 64;

/// Encoder for header and trailer blocks implementing the [`Encoder`] trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEncoder;

impl Encoder<&Headers> for HeaderEncoder {
    type Error = WriteError;

    fn encode(&mut self, headers: &Headers, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_LINE_SIZE * (headers.len() + 1));

        for (name, value) in headers {
            dst.put_slice(name.as_bytes());
            dst.put_slice(b": ");
            dst.put_slice(value.as_bytes());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
