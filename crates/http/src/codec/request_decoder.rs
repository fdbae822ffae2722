//! HTTP request decoder module
//!
//! [`RequestDecoder`] adapts the resumable [`Request`] parser to the
//! [`tokio_util::codec::Decoder`] interface: every call feeds the unconsumed part of
//! the read buffer to the parser, drops the bytes the parser used, and yields the
//! request once it reaches [`ParseState::Done`](crate::protocol::ParseState::Done).
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use raw_http::codec::RequestDecoder;
//! use raw_http::protocol::Method;
//! use tokio_util::codec::Decoder;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from(&b"GET /index.html HTTP/1.1\r\nHost: local"[..]);
//! assert!(decoder.decode(&mut buffer).unwrap().is_none());
//!
//! buffer.extend_from_slice(b"host\r\n\r\n");
//! let request = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(request.method(), Some(Method::Get));
//! assert_eq!(request.headers().get("host"), Some("localhost"));
//! ```

use std::mem;

use crate::protocol::{ParseError, ParseState, Request};
use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::{debug, trace};

/// A decoder producing one [`Request`] per complete message.
///
/// After a request has been yielded the decoder starts over with a fresh one.
#[derive(Debug, Default)]
pub struct RequestDecoder {
    request: Request,
}

impl RequestDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The state of the request currently being parsed.
    pub fn state(&self) -> ParseState {
        self.request.state()
    }
}

impl Decoder for RequestDecoder {
    type Item = Request;
    type Error = ParseError;

    /// Attempts to decode a request from the provided buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(request))`: the request is complete
    /// - `Ok(None)`: need more data to proceed
    /// - `Err(_)`: the bytes do not form a supported request
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let consumed = self.request.parse(src)?;
        src.advance(consumed);
        trace!(consumed, remaining = src.len(), state = ?self.request.state(), "decoded request bytes");

        if self.request.is_done() {
            return Ok(Some(mem::take(&mut self.request)));
        }
        Ok(None)
    }

    /// Finishes the current request when the peer stops sending.
    ///
    /// A request whose request line has been read is completed best-effort with
    /// whatever headers and body arrived. If not even the request line arrived the
    /// stream carried no request and `Ok(None)` is returned.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(request) = self.decode(src)? {
            return Ok(Some(request));
        }

        if self.request.state() == ParseState::Init {
            debug!(remaining = src.len(), "stream ended before request line");
            src.clear();
            return Ok(None);
        }

        debug!(state = ?self.request.state(), remaining = src.len(), "stream ended before request was complete");
        src.clear();
        self.request.finish();
        Ok(Some(mem::take(&mut self.request)))
    }
}
