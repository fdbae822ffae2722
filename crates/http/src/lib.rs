//! A minimal HTTP/1.1 implementation over raw byte streams
//!
//! This crate parses requests and writes responses directly on top of tokio's
//! `AsyncRead`/`AsyncWrite`, without any HTTP library underneath. Every connection
//! carries exactly one request and is closed once the response has been written.
//!
//! # Features
//!
//! - Incremental request parsing that gives the same result however the input is split
//! - Case-insensitive, order-preserving header store with folding of repeated fields
//! - Response writer with fixed-length and chunked bodies, including trailers
//! - TCP server with per-connection tasks and graceful close
//!
//! # Architecture
//!
//! - [`protocol`]: requests, headers, status codes and error types
//! - [`codec`]: the request decoder and response encoder
//! - [`connection`]: reading a request from and writing a response to a stream
//! - [`handler`]: the trait user code implements to answer requests
//! - [`server`]: the TCP accept loop
//!
//! # Error Handling
//!
//! - [`protocol::ParseError`]: a request could not be parsed, answered with `400 Bad Request`
//! - [`protocol::WriteError`]: a response part was written out of order or the stream failed
//! - [`protocol::HttpError`]: either of the above, as reported by a connection
//! - [`server::ServerError`]: the server could not be configured or bound
//!
//! # Limitations
//!
//! - Only `GET` and `POST` requests are accepted
//! - No keep-alive or pipelining: one request per connection
//! - Chunked request bodies are not decoded; only `Content-Length` bodies are read
//! - No TLS support (use a reverse proxy for HTTPS)

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod server;

mod utils;
pub(crate) use utils::ensure;
