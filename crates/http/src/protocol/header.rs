//! Case-insensitive header store with incremental line parsing.
//!
//! [`Headers`] keeps every key lowercased and trimmed. A key seen more than once is
//! folded into a single entry whose value is `"<first>, <second>, ..."` in arrival
//! order, so a request carrying
//!
//! ```text
//! X-Foo: a
//! X-Foo: b
//! ```
//!
//! ends up with a single `x-foo: a, b` entry. Entries iterate in the order their key
//! was first inserted, which keeps serialized header blocks deterministic.

use std::fmt;

use indexmap::IndexMap;
use indexmap::map::Iter;
use tracing::trace;

use crate::ensure;
use crate::protocol::ParseError;

const CRLF: &[u8] = b"\r\n";

/// Result of feeding one line to [`Headers::parse_one`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HeaderLine {
    /// Number of bytes consumed from the front of the buffer, CRLF included.
    pub consumed: usize,
    /// Set when the consumed line was the blank line closing the header block.
    pub end_of_headers: bool,
}

impl HeaderLine {
    const NEED_MORE: Self = Self { consumed: 0, end_of_headers: false };
    const END: Self = Self { consumed: CRLF.len(), end_of_headers: true };
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    inner: IndexMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses at most one header line from the front of `src`.
    ///
    /// Returns [`HeaderLine::consumed`] == 0 when `src` holds no complete line yet;
    /// the caller must retry once more bytes are available. Bytes that are not valid
    /// UTF-8 are kept as U+FFFD; in a key they fail the token check.
    ///
    /// # Errors
    ///
    /// - [`ParseError::InvalidHeader`] if the line has no colon, or the key is empty
    ///   or followed by whitespace
    /// - [`ParseError::InvalidHeaderName`] if the key has a non-token character
    pub fn parse_one(&mut self, src: &[u8]) -> Result<HeaderLine, ParseError> {
        let Some(eol) = find_crlf(src) else {
            return Ok(HeaderLine::NEED_MORE);
        };

        if eol == 0 {
            return Ok(HeaderLine::END);
        }

        let line = String::from_utf8_lossy(&src[..eol]);
        let (raw_key, raw_value) = line.split_once(':').ok_or_else(|| ParseError::invalid_header(format!("missing colon in {line:?}")))?;

        ensure!(raw_key == raw_key.trim_end(), ParseError::invalid_header(format!("whitespace before colon in {line:?}")));

        let key = raw_key.trim().to_ascii_lowercase();
        validate_name(&key)?;

        let value = raw_value.trim();
        trace!(key = %key, value = %value, "parsed header line");
        self.append(key, value);

        Ok(HeaderLine { consumed: eol + CRLF.len(), end_of_headers: false })
    }

    /// Inserts `value`, folding it into an existing entry as `"<old>, <new>"`.
    pub fn append<K: AsRef<str>>(&mut self, key: K, value: &str) {
        let key = key.as_ref().to_ascii_lowercase();
        match self.inner.get_mut(&key) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => {
                self.inner.insert(key, value.to_string());
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(&key.to_ascii_lowercase()).map(String::as_str)
    }

    /// Stores `value` under the lowercased `key`, replacing any previous value.
    pub fn set<V: Into<String>>(&mut self, key: &str, value: V) {
        self.inner.insert(key.to_ascii_lowercase(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.inner.shift_remove(&key.to_ascii_lowercase())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(&key.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, String, String> {
        self.inner.iter()
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a String, &'a String);
    type IntoIter = Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for Headers {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut headers = Headers::new();
        for (key, value) in iter {
            headers.append(key, value.as_ref());
        }
        headers
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self {
            write!(f, "{key}: {value}\r\n")?;
        }
        Ok(())
    }
}

pub(crate) fn find_crlf(src: &[u8]) -> Option<usize> {
    src.windows(CRLF.len()).position(|window| window == CRLF)
}

/// RFC 9110 `tchar`: letters, digits and ``! # $ % & ' * + - . ^ _ ` | ~``.
fn is_token_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(ch)
}

fn validate_name(name: &str) -> Result<(), ParseError> {
    ensure!(!name.is_empty(), ParseError::invalid_header("empty header name"));

    match name.chars().find(|ch| !is_token_char(*ch)) {
        Some(ch) => Err(ParseError::InvalidHeaderName { name: name.to_string(), ch }),
        None => Ok(()),
    }
}
