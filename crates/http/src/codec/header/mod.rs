//! HTTP header block encoding
//!
//! Header parsing lives with the header store itself
//! ([`Headers::parse_one`](crate::protocol::Headers::parse_one)) because the request
//! parser drives it one line at a time. This module covers the outbound direction:
//!
//! - [`HeaderEncoder`]: writes a [`Headers`](crate::protocol::Headers) map as a header
//!   or trailer block, terminated by a blank line

mod header_encoder;

pub use header_encoder::HeaderEncoder;
