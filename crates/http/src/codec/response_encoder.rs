//! HTTP response encoder
//!
//! [`ResponseEncoder`] turns the individual pieces of a response into bytes while
//! enforcing the order in which they may appear on the wire. A part that is not
//! legal in the current [`WriterState`] is rejected with
//! [`WriteError::InvalidState`] before anything is written to the destination
//! buffer, and the state is left untouched.

use crate::codec::body::{Chunk, ChunkedEncoder};
use crate::codec::header::HeaderEncoder;
use crate::protocol::{Headers, StatusCode, WriteError, WriterState};
use bytes::{BufMut, BytesMut};
use std::io;
use std::io::Write;
use tokio_util::codec::Encoder;
use tracing::trace;

/// A piece of a response, in the order pieces are allowed to be sent.
#[derive(Debug, Clone, Copy)]
pub enum ResponsePart<'a> {
    StatusLine(StatusCode),
    Headers(&'a Headers),
    Body(&'a [u8]),
    Chunk(&'a [u8]),
    ChunkedBodyDone,
    Trailers(&'a Headers),
}

impl ResponsePart<'_> {
    /// Operation name used in state errors.
    pub fn operation(&self) -> &'static str {
        match self {
            ResponsePart::StatusLine(_) => "write status line",
            ResponsePart::Headers(_) => "write headers",
            ResponsePart::Body(_) => "write body",
            ResponsePart::Chunk(_) => "write chunked body",
            ResponsePart::ChunkedBodyDone => "write chunked body done",
            ResponsePart::Trailers(_) => "write trailers",
        }
    }

    /// The only state in which this part may be encoded.
    fn expected_state(&self) -> WriterState {
        match self {
            ResponsePart::StatusLine(_) => WriterState::StatusLine,
            ResponsePart::Headers(_) => WriterState::Headers,
            ResponsePart::Body(_) | ResponsePart::Chunk(_) | ResponsePart::ChunkedBodyDone => WriterState::Body,
            ResponsePart::Trailers(_) => WriterState::Trailers,
        }
    }
}

#[derive(Debug, Default)]
pub struct ResponseEncoder {
    state: WriterState,
    header_encoder: HeaderEncoder,
    chunked_encoder: ChunkedEncoder,
}

impl ResponseEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WriterState {
        self.state
    }
}

impl<'a> Encoder<ResponsePart<'a>> for ResponseEncoder {
    type Error = WriteError;

    fn encode(&mut self, item: ResponsePart<'a>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.state != item.expected_state() {
            return Err(WriteError::invalid_state(item.operation(), self.state));
        }

        let next_state = match item {
            ResponsePart::StatusLine(status) => {
                match status.canonical_reason() {
                    Some(reason) => write!(FastWrite(dst), "HTTP/1.1 {status} {reason}\r\n")?,
                    None => write!(FastWrite(dst), "HTTP/1.1 {status}\r\n")?,
                }
                WriterState::Headers
            }
            ResponsePart::Headers(headers) => {
                self.header_encoder.encode(headers, dst)?;
                WriterState::Body
            }
            ResponsePart::Body(bytes) => {
                dst.put_slice(bytes);
                WriterState::Body
            }
            ResponsePart::Chunk(bytes) => {
                self.chunked_encoder.encode(Chunk::Data(bytes), dst)?;
                WriterState::Body
            }
            ResponsePart::ChunkedBodyDone => {
                self.chunked_encoder.encode(Chunk::Last, dst)?;
                WriterState::Trailers
            }
            ResponsePart::Trailers(trailers) => {
                self.header_encoder.encode(trailers, dst)?;
                WriterState::Done
            }
        };

        if next_state != self.state {
            trace!(from = ?self.state, to = ?next_state, "response writer state changed");
        }
        self.state = next_state;
        Ok(())
    }
}

/// Writes formatted status lines straight into the destination buffer.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
