//! HTTP codec module for encoding and decoding HTTP/1.1 messages
//!
//! Everything here works on in-memory buffers; moving bytes to and from the
//! socket is the job of [`crate::connection`].
//!
//! # Architecture
//!
//! - Request handling:
//!   - [`RequestDecoder`]: drives the resumable request parser over a read buffer
//!
//! - Response handling:
//!   - [`ResponseEncoder`]: encodes response parts and enforces their order
//!   - Header and trailer blocks via [`HeaderEncoder`]
//!   - Chunked bodies via [`ChunkedEncoder`]
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use raw_http::codec::{ResponseEncoder, ResponsePart};
//! use raw_http::protocol::{StatusCode, default_headers};
//! use tokio_util::codec::Encoder;
//!
//! let mut encoder = ResponseEncoder::new();
//! let mut buffer = BytesMut::new();
//! let headers = default_headers(2);
//!
//! encoder.encode(ResponsePart::StatusLine(StatusCode::OK), &mut buffer).unwrap();
//! encoder.encode(ResponsePart::Headers(&headers), &mut buffer).unwrap();
//! encoder.encode(ResponsePart::Body(b"ok"), &mut buffer).unwrap();
//!
//! assert!(buffer.starts_with(b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\n"));
//! assert!(buffer.ends_with(b"\r\n\r\nok"));
//! ```

mod body;
mod header;
mod request_decoder;
mod response_encoder;

pub use body::{Chunk, ChunkedEncoder};
pub use header::HeaderEncoder;
pub use request_decoder::RequestDecoder;
pub use response_encoder::{ResponseEncoder, ResponsePart};
