//! Request value and the resumable parser that fills it.
//!
//! A [`Request`] is built incrementally: [`Request::parse`] is handed whatever bytes
//! are currently buffered, consumes every complete token it can (the request line,
//! header lines, body bytes) and reports how many bytes it used. The caller drops
//! the consumed prefix and calls again once more bytes have arrived, until
//! [`Request::is_done`] holds.
//!
//! ```text
//! Init --request line--> ReadingHeaders --blank line--> ReadingBody --content-length reached--> Done
//!                                       \--blank line, no content-length-------------------/
//! ```

use std::fmt;
use std::str::FromStr;

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::ensure;
use crate::protocol::header::find_crlf;
use crate::protocol::{Headers, ParseError};

const CRLF_LEN: usize = 2;

/// The only protocol version accepted on the request line.
pub const HTTP_VERSION: &str = "1.1";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl FromStr for Method {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            _ => Err(ParseError::UnsupportedMethod { method: s.to_string() }),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    pub target: String,
    /// Always [`HTTP_VERSION`] once parsed.
    pub version: String,
}

impl RequestLine {
    /// Parses the first line of `src`.
    ///
    /// Returns `Ok(None)` until a full CRLF-terminated line is available, otherwise
    /// the request line together with the number of bytes it occupied.
    fn parse(src: &[u8]) -> Result<Option<(Self, usize)>, ParseError> {
        let Some(eol) = find_crlf(src) else {
            return Ok(None);
        };

        let line = String::from_utf8_lossy(&src[..eol]);

        let parts: Vec<&str> = line.split(' ').collect();
        let [method, target, version] = parts[..] else {
            return Err(ParseError::malformed_request_line(format!("expect 3 parts, found {} in {line:?}", parts.len())));
        };

        let method = method.parse::<Method>()?;

        // only the trailing "1.1" of the version token is checked
        let version = version
            .len()
            .checked_sub(HTTP_VERSION.len())
            .and_then(|start| version.get(start..))
            .filter(|v| *v == HTTP_VERSION)
            .ok_or_else(|| ParseError::UnsupportedVersion { version: version.to_string() })?;

        let request_line = RequestLine { method, target: target.to_string(), version: version.to_string() };
        Ok(Some((request_line, eol + CRLF_LEN)))
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} HTTP/{}", self.method, self.target, self.version)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParseState {
    Init,
    ReadingHeaders,
    ReadingBody,
    Done,
}

/// A request as read off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    state: ParseState,
    request_line: Option<RequestLine>,
    headers: Headers,
    body: BytesMut,
    content_length: Option<usize>,
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// Creates an empty request in the [`ParseState::Init`] state.
    pub fn new() -> Self {
        Self { state: ParseState::Init, request_line: None, headers: Headers::new(), body: BytesMut::new(), content_length: None }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == ParseState::Done
    }

    /// The parsed request line, `None` while still in [`ParseState::Init`].
    pub fn request_line(&self) -> Option<&RequestLine> {
        self.request_line.as_ref()
    }

    pub fn method(&self) -> Option<Method> {
        self.request_line.as_ref().map(|line| line.method)
    }

    pub fn target(&self) -> Option<&str> {
        self.request_line.as_ref().map(|line| line.target.as_str())
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Bytes {
        self.body.freeze()
    }

    /// Declared `Content-Length`, known once the header block has been read.
    pub fn content_length(&self) -> Option<usize> {
        self.content_length
    }

    /// Consumes as much of `src` as currently forms complete tokens.
    ///
    /// Returns the number of bytes used; the remainder must be offered again,
    /// followed by newly read bytes, on the next call.
    ///
    /// # Errors
    ///
    /// Any malformed token aborts parsing; calling again after [`ParseState::Done`]
    /// returns [`ParseError::InvalidState`].
    pub fn parse(&mut self, src: &[u8]) -> Result<usize, ParseError> {
        ensure!(self.state != ParseState::Done, ParseError::InvalidState { state: self.state });

        let mut total = 0;
        while self.state != ParseState::Done {
            let n = self.parse_single(&src[total..])?;
            total += n;
            if n == 0 {
                break;
            }
        }

        Ok(total)
    }

    /// Marks the request done with whatever has been parsed, used when the peer
    /// stops sending before the request is complete.
    pub(crate) fn finish(&mut self) {
        trace!(state = ?self.state, body_size = self.body.len(), "finishing request at end of stream");
        self.state = ParseState::Done;
    }

    fn parse_single(&mut self, src: &[u8]) -> Result<usize, ParseError> {
        match self.state {
            ParseState::Init => match RequestLine::parse(src)? {
                Some((request_line, n)) => {
                    trace!(request_line = %request_line, "parsed request line");
                    self.request_line = Some(request_line);
                    self.state = ParseState::ReadingHeaders;
                    Ok(n)
                }
                None => Ok(0),
            },

            ParseState::ReadingHeaders => {
                let line = self.headers.parse_one(src)?;
                if line.end_of_headers {
                    self.content_length = parse_content_length(&self.headers)?;
                    self.state = match self.content_length {
                        Some(_) => ParseState::ReadingBody,
                        None => ParseState::Done,
                    };
                    trace!(state = ?self.state, content_length = ?self.content_length, "finished reading headers");
                }
                Ok(line.consumed)
            }

            ParseState::ReadingBody => {
                let expected = self.content_length.unwrap_or_default();
                self.body.extend_from_slice(src);

                let actual = self.body.len();
                ensure!(actual <= expected, ParseError::BodyOverflow { expected, actual });

                if actual == expected {
                    self.state = ParseState::Done;
                }
                Ok(src.len())
            }

            ParseState::Done => Err(ParseError::InvalidState { state: self.state }),
        }
    }
}

fn parse_content_length(headers: &Headers) -> Result<Option<usize>, ParseError> {
    let Some(value) = headers.get("content-length") else {
        return Ok(None);
    };

    value.parse::<usize>().map(Some).map_err(|_e| ParseError::invalid_content_length(format!("value {value:?} is not a length")))
}
