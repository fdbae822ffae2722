//! HTTP connection handling module
//!
//! This module drives one request/response exchange over an async byte stream.
//!
//! # Components
//!
//! - [`RequestReader`]: accumulates bytes from the stream in a growing buffer and
//!   feeds them to the request parser until a request is complete
//! - [`ResponseWriter`]: the handle a handler uses to emit its response, part by
//!   part, in protocol order
//! - [`HttpConnection`]: reads one request, answers malformed ones with
//!   `400 Bad Request`, runs the handler, then closes the stream

mod http_connection;
mod request_reader;
mod response_writer;

pub use http_connection::HttpConnection;
pub use request_reader::{RequestReader, DEFAULT_READ_BUFFER_CAPACITY};
pub use response_writer::ResponseWriter;
