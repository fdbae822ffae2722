//! Core HTTP/1.1 protocol types.
//!
//! This module holds the values that flow through the rest of the crate: the
//! parsed request, the header store shared by requests and responses, response
//! status codes and the error types raised while reading or writing a message.
//!
//! # Components
//!
//! - **Headers** (`header`): [`Headers`], a case-insensitive, folding header store
//!   that can also parse itself one line at a time
//! - **Request** (`request`): [`Request`], [`RequestLine`], [`Method`] and the
//!   resumable [`ParseState`] machine
//! - **Response** (`response`): [`StatusCode`], [`WriterState`] and
//!   [`default_headers`]
//! - **Errors** (`error`): [`HttpError`], [`ParseError`], [`WriteError`]
//!
//! Only the subset of HTTP/1.1 needed for one request per connection is modelled:
//! `GET`/`POST` requests with an optional `Content-Length` body.

mod header;
pub use header::HeaderLine;
pub use header::Headers;

mod request;
pub use request::HTTP_VERSION;
pub use request::Method;
pub use request::ParseState;
pub use request::Request;
pub use request::RequestLine;

mod response;
pub use response::StatusCode;
pub use response::WriterState;
pub use response::default_headers;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::WriteError;
