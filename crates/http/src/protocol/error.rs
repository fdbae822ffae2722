use std::io;
use thiserror::Error;

use crate::protocol::{ParseState, WriterState};

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: WriteError,
    },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed request line: {reason}")]
    MalformedRequestLine { reason: String },

    #[error("unsupported http method: {method:?}")]
    UnsupportedMethod { method: String },

    #[error("unsupported http version: {version:?}")]
    UnsupportedVersion { version: String },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid character {ch:?} in header name {name:?}")]
    InvalidHeaderName { name: String, ch: char },

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("body length {actual} exceeds content-length {expected}")]
    BodyOverflow { expected: usize, actual: usize },

    #[error("can't parse more data in {state:?} state")]
    InvalidState { state: ParseState },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn malformed_request_line<S: ToString>(str: S) -> Self {
        Self::MalformedRequestLine { reason: str.to_string() }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("can't {operation} in {state:?} state")]
    InvalidState { operation: &'static str, state: WriterState },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl WriteError {
    pub fn invalid_state(operation: &'static str, state: WriterState) -> Self {
        Self::InvalidState { operation, state }
    }

    /// Returns true if the error was raised by calling an operation out of order.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }
}
