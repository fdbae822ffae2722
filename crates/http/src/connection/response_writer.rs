use std::fmt;

use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;

use crate::codec::{ResponseEncoder, ResponsePart};
use crate::protocol::{Headers, StatusCode, WriteError, WriterState};

const INITIAL_BUFFER_CAPACITY: usize = 256;

/// Writes one response to a byte sink, one part at a time.
///
/// Every call is checked against the current [`WriterState`]; a call made out of
/// order fails with [`WriteError::InvalidState`] and sends nothing. Each successful
/// call is written through to the sink before it returns, so a chunked body reaches
/// the peer while the handler is still producing it.
///
/// ```
/// use raw_http::connection::ResponseWriter;
/// use raw_http::protocol::{default_headers, StatusCode};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut sink = Vec::new();
/// let mut writer = ResponseWriter::new(&mut sink);
/// writer.write_status_line(StatusCode::OK).await.unwrap();
/// writer.write_headers(&default_headers(2)).await.unwrap();
/// writer.write_body(b"ok").await.unwrap();
///
/// assert!(sink.ends_with(b"\r\n\r\nok"));
/// # }
/// ```
pub struct ResponseWriter<'a> {
    sink: &'a mut (dyn AsyncWrite + Send + Unpin),
    buffer: BytesMut,
    encoder: ResponseEncoder,
}

impl<'a> ResponseWriter<'a> {
    pub fn new(sink: &'a mut (dyn AsyncWrite + Send + Unpin)) -> Self {
        Self { sink, buffer: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY), encoder: ResponseEncoder::new() }
    }

    pub fn state(&self) -> WriterState {
        self.encoder.state()
    }

    /// Writes `HTTP/1.1 <code> <reason>`; codes without a known reason get no phrase.
    ///
    /// # Errors
    ///
    /// Fails unless this is the first write of the response.
    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<(), WriteError> {
        self.send(ResponsePart::StatusLine(status)).await
    }

    /// Writes the header block, including the blank line that ends it.
    ///
    /// # Errors
    ///
    /// Fails unless the status line has been written and headers have not.
    pub async fn write_headers(&mut self, headers: &Headers) -> Result<(), WriteError> {
        self.send(ResponsePart::Headers(headers)).await
    }

    /// Writes raw body bytes and returns how many were written.
    ///
    /// May be called repeatedly. Nothing checks that the total matches the
    /// `content-length` header that was sent.
    ///
    /// # Errors
    ///
    /// Fails unless the headers have been written and the chunked body is not done.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<usize, WriteError> {
        self.send(ResponsePart::Body(body)).await?;
        Ok(body.len())
    }

    /// Writes `body` as one chunk of a chunked body and returns `body.len()`.
    ///
    /// An empty `body` produces the zero-length chunk and so ends the body on the
    /// wire; use [`write_chunked_body_done`](Self::write_chunked_body_done) instead.
    ///
    /// # Errors
    ///
    /// Same as [`write_body`](Self::write_body).
    pub async fn write_chunked_body(&mut self, body: &[u8]) -> Result<usize, WriteError> {
        self.send(ResponsePart::Chunk(body)).await?;
        Ok(body.len())
    }

    /// Writes the zero-length chunk `0\r\n` that ends a chunked body.
    ///
    /// The caller must follow up with [`write_trailers`](Self::write_trailers),
    /// possibly with an empty set, to finish the message.
    ///
    /// # Errors
    ///
    /// Same as [`write_body`](Self::write_body).
    pub async fn write_chunked_body_done(&mut self) -> Result<(), WriteError> {
        self.send(ResponsePart::ChunkedBodyDone).await
    }

    /// Writes the trailer block and the final blank line, completing the response.
    ///
    /// # Errors
    ///
    /// Fails unless the chunked body has just been finished.
    pub async fn write_trailers(&mut self, trailers: &Headers) -> Result<(), WriteError> {
        self.send(ResponsePart::Trailers(trailers)).await
    }

    /// Flushes the underlying sink.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::Io`] if the sink fails.
    pub async fn flush(&mut self) -> Result<(), WriteError> {
        Ok(self.sink.flush().await?)
    }

    async fn send(&mut self, part: ResponsePart<'_>) -> Result<(), WriteError> {
        self.buffer.clear();
        self.encoder.encode(part, &mut self.buffer)?;
        self.sink.write_all(&self.buffer).await?;
        Ok(self.sink.flush().await?)
    }
}

impl fmt::Debug for ResponseWriter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseWriter").field("state", &self.encoder.state()).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::default_headers;
    use std::str;

    #[tokio::test]
    async fn fixed_length_response() {
        let mut sink = Vec::new();
        let mut writer = ResponseWriter::new(&mut sink);

        writer.write_status_line(StatusCode::OK).await.unwrap();
        writer.write_headers(&default_headers(13)).await.unwrap();
        assert_eq!(writer.write_body(b"Hello, World!").await.unwrap(), 13);
        assert_eq!(writer.state(), WriterState::Body);

        assert_eq!(
            str::from_utf8(&sink).unwrap(),
            "HTTP/1.1 200 OK\r\ncontent-length: 13\r\nconnection: close\r\ncontent-type: text/plain\r\n\r\nHello, World!"
        );
    }

    #[tokio::test]
    async fn headers_before_status_line() {
        let mut sink = Vec::new();
        let mut writer = ResponseWriter::new(&mut sink);

        let err = writer.write_headers(&default_headers(0)).await.unwrap_err();

        assert!(matches!(err, WriteError::InvalidState { operation: "write headers", state: WriterState::StatusLine }));
        assert_eq!(writer.state(), WriterState::StatusLine);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn status_line_only_once() {
        let mut sink = Vec::new();
        let mut writer = ResponseWriter::new(&mut sink);

        writer.write_status_line(StatusCode::BAD_REQUEST).await.unwrap();
        let err = writer.write_status_line(StatusCode::OK).await.unwrap_err();

        assert!(err.is_invalid_state());
        assert_eq!(sink, b"HTTP/1.1 400 Bad Request\r\n");
    }

    #[tokio::test]
    async fn chunked_body_with_trailers() {
        let mut sink = Vec::new();
        let mut writer = ResponseWriter::new(&mut sink);
        let mut headers = Headers::new();
        headers.set("Transfer-Encoding", "chunked");
        headers.set("Trailer", "X-Content-Length");
        let mut trailers = Headers::new();
        trailers.set("X-Content-Length", "5");

        writer.write_status_line(StatusCode::OK).await.unwrap();
        writer.write_headers(&headers).await.unwrap();
        assert_eq!(writer.write_chunked_body(b"abc").await.unwrap(), 3);
        assert_eq!(writer.write_chunked_body(b"de").await.unwrap(), 2);
        writer.write_chunked_body_done().await.unwrap();
        assert_eq!(writer.state(), WriterState::Trailers);
        writer.write_trailers(&trailers).await.unwrap();
        assert_eq!(writer.state(), WriterState::Done);

        let text = str::from_utf8(&sink).unwrap();
        let (_, body) = text.split_once("\r\n\r\n").unwrap();
        assert_eq!(body, "3\r\nabc\r\n2\r\nde\r\n0\r\nx-content-length: 5\r\n\r\n");
    }

    #[tokio::test]
    async fn chunk_after_done() {
        let mut sink = Vec::new();
        let mut writer = ResponseWriter::new(&mut sink);

        writer.write_status_line(StatusCode::OK).await.unwrap();
        writer.write_headers(&Headers::new()).await.unwrap();
        writer.write_chunked_body_done().await.unwrap();

        let err = writer.write_chunked_body(b"late").await.unwrap_err();
        assert!(matches!(err, WriteError::InvalidState { state: WriterState::Trailers, .. }));

        writer.write_trailers(&Headers::new()).await.unwrap();
        let err = writer.write_body(b"late").await.unwrap_err();
        assert!(matches!(err, WriteError::InvalidState { state: WriterState::Done, .. }));

        assert_eq!(sink, b"HTTP/1.1 200 OK\r\n\r\n0\r\n\r\n");
    }

    #[tokio::test]
    async fn chunked_body_decodes_back() {
        let mut sink = Vec::new();
        let mut writer = ResponseWriter::new(&mut sink);
        writer.write_status_line(StatusCode::OK).await.unwrap();
        writer.write_headers(&Headers::new()).await.unwrap();
        for piece in [&b"raw"[..], b"-", b"http chunks"] {
            writer.write_chunked_body(piece).await.unwrap();
        }
        writer.write_chunked_body_done().await.unwrap();
        writer.write_trailers(&Headers::new()).await.unwrap();

        let mut rest = &sink[b"HTTP/1.1 200 OK\r\n\r\n".len()..];
        let mut body = Vec::new();
        loop {
            let httparse::Status::Complete((offset, size)) = httparse::parse_chunk_size(rest).unwrap() else {
                panic!("incomplete chunk size line");
            };
            let size = usize::try_from(size).unwrap();
            rest = &rest[offset..];
            if size == 0 {
                break;
            }
            body.extend_from_slice(&rest[..size]);
            assert_eq!(&rest[size..size + 2], b"\r\n");
            rest = &rest[size + 2..];
        }

        assert_eq!(body, b"raw-http chunks");
        assert_eq!(rest, b"\r\n");
    }

    #[tokio::test]
    async fn write_error_from_closed_peer() {
        let (client, mut server) = tokio::io::duplex(16);
        drop(client);
        let mut writer = ResponseWriter::new(&mut server);

        let err = writer.write_status_line(StatusCode::OK).await.unwrap_err();

        assert!(matches!(err, WriteError::Io { .. }));
    }
}
