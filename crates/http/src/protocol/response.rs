//! Response-side protocol types.
//!
//! The write order of a response is tracked by [`WriterState`]; the encoding lives
//! in [`crate::codec::ResponseEncoder`].

use std::fmt;

use crate::protocol::Headers;

/// An HTTP status code.
///
/// Any three-digit code can be written, but only the codes with an associated
/// constant carry a reason phrase on the status line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    pub const fn from_u16(code: u16) -> Self {
        Self(code)
    }

    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Reason phrase for the status line, `None` for codes outside the fixed table.
    pub fn canonical_reason(self) -> Option<&'static str> {
        match self.0 {
            200 => Some("OK"),
            400 => Some("Bad Request"),
            500 => Some("Internal Server Error"),
            _ => None,
        }
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a [`ResponseWriter`](crate::connection::ResponseWriter) in the response.
///
/// States only move forward: `StatusLine -> Headers -> Body -> Trailers -> Done`.
/// `Body` accepts any number of body or chunk writes before moving on.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum WriterState {
    #[default]
    StatusLine,
    Headers,
    Body,
    Trailers,
    Done,
}

/// Starting headers for a fixed-length response of `content_length` bytes.
///
/// ```
/// use raw_http::protocol::default_headers;
///
/// let headers = default_headers(12);
/// assert_eq!(headers.get("Content-Length"), Some("12"));
/// assert_eq!(headers.get("Connection"), Some("close"));
/// assert_eq!(headers.get("Content-Type"), Some("text/plain"));
/// ```
pub fn default_headers(content_length: usize) -> Headers {
    let mut headers = Headers::new();
    headers.set("Content-Length", content_length.to_string());
    headers.set("Connection", "close");
    headers.set("Content-Type", mime::TEXT_PLAIN.as_ref());
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_phrases() {
        assert_eq!(StatusCode::OK.canonical_reason(), Some("OK"));
        assert_eq!(StatusCode::BAD_REQUEST.canonical_reason(), Some("Bad Request"));
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR.canonical_reason(), Some("Internal Server Error"));
        assert_eq!(StatusCode::from(404).canonical_reason(), None);
        assert_eq!(StatusCode::from_u16(418).to_string(), "418");
        assert_eq!(StatusCode::BAD_REQUEST.as_u16(), 400);
    }

    #[test]
    fn default_headers_order() {
        let headers = default_headers(0);

        let keys: Vec<_> = headers.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, ["content-length", "connection", "content-type"]);
        assert_eq!(headers.get("content-length"), Some("0"));
    }
}
