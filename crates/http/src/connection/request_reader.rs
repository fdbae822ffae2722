use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::RequestDecoder;
use crate::protocol::{ParseError, Request};

/// Default initial size of the read buffer
pub const DEFAULT_READ_BUFFER_CAPACITY: usize = 1024;

/// Reads one request from an async byte stream.
///
/// The read buffer starts at the configured capacity and doubles whenever it is
/// full before the next read, so a request of any size can be assembled from reads
/// of any size, down to a single byte. Bytes the parser has consumed are dropped
/// from the front of the buffer after every read.
#[derive(Debug)]
pub struct RequestReader<R> {
    reader: R,
    buffer: BytesMut,
    decoder: RequestDecoder,
}

impl<R> RequestReader<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, DEFAULT_READ_BUFFER_CAPACITY)
    }

    /// Creates a reader whose buffer initially holds `capacity` bytes (at least one).
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self { reader, buffer: BytesMut::with_capacity(capacity.max(1)), decoder: RequestDecoder::new() }
    }

    /// Current capacity of the read buffer.
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Reads until a full request has been parsed or the stream ends.
    ///
    /// Returns `Ok(None)` if the stream ended before a request line arrived. A
    /// stream that ends part-way through a request yields that request completed
    /// best-effort.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`] raised by the parser, or
    /// [`ParseError::Io`] if reading fails.
    pub async fn read_request(&mut self) -> Result<Option<Request>, ParseError> {
        loop {
            if self.buffer.len() == self.buffer.capacity() {
                let additional = self.buffer.capacity().max(1);
                self.buffer.reserve(additional);
                trace!(capacity = self.buffer.capacity(), "grew read buffer");
            }

            let n = self.reader.read_buf(&mut self.buffer).await?;
            if n == 0 {
                return self.decoder.decode_eof(&mut self.buffer);
            }

            if let Some(request) = self.decoder.decode(&mut self.buffer)? {
                return Ok(Some(request));
            }
        }
    }
}
