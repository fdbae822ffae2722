use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::connection::{RequestReader, ResponseWriter};
use crate::handler::Handler;
use crate::protocol::{default_headers, HttpError, ParseError, StatusCode, WriteError, WriterState};

/// A single-request HTTP connection.
///
/// `HttpConnection` reads exactly one request, hands it to a [`Handler`] together
/// with a [`ResponseWriter`], and then shuts the write side down. A request that
/// fails to parse is answered with `400 Bad Request` carrying the parse error as a
/// plain-text body, and the handler is never called.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    reader: RequestReader<R>,
    writer: W,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Send + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader: RequestReader::new(reader), writer }
    }

    /// Creates a connection whose read buffer starts at `read_buffer_capacity` bytes.
    pub fn with_capacity(reader: R, writer: W, read_buffer_capacity: usize) -> Self {
        Self { reader: RequestReader::with_capacity(reader, read_buffer_capacity), writer }
    }

    /// Serves the one request on this connection.
    ///
    /// # Errors
    ///
    /// Returns the parse error for a malformed request, after the `400` response has
    /// been sent, or any I/O error raised while reading the request, writing the
    /// response, or shutting the connection down. Errors a handler gets back from
    /// its [`ResponseWriter`] are the handler's to deal with and are not reported here.
    pub async fn process<H>(mut self, handler: &H) -> Result<(), HttpError>
    where
        H: Handler + ?Sized,
    {
        let request = match self.reader.read_request().await {
            Ok(Some(request)) => request,
            Ok(None) => {
                info!("connection closed before a request arrived");
                return self.shutdown().await;
            }
            Err(e @ ParseError::Io { .. }) => return Err(e.into()),
            Err(e) => {
                warn!(cause = %e, "can't parse request, sending bad request");
                self.send_bad_request(&e).await?;
                self.shutdown().await?;
                return Err(e.into());
            }
        };

        if let Some(request_line) = request.request_line() {
            info!(%request_line, headers = request.headers().len(), body = request.body().len(), "received request");
        }

        let state = {
            let mut writer = ResponseWriter::new(&mut self.writer);
            handler.call(&mut writer, request).await;
            writer.state()
        };
        if state == WriterState::StatusLine {
            debug!("handler wrote no response");
        }

        self.shutdown().await
    }

    async fn send_bad_request(&mut self, error: &ParseError) -> Result<(), WriteError> {
        let message = error.to_string();
        let mut writer = ResponseWriter::new(&mut self.writer);
        writer.write_status_line(StatusCode::BAD_REQUEST).await?;
        writer.write_headers(&default_headers(message.len())).await?;
        writer.write_body(message.as_bytes()).await?;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), HttpError> {
        self.writer.shutdown().await.map_err(WriteError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Headers, Method, Request};
    use async_trait::async_trait;
    use indoc::indoc;
    use std::str;
    use std::sync::Mutex;
    use tokio::io::AsyncReadExt;

    /// Records the request and echoes its body back.
    #[derive(Default)]
    struct EchoHandler {
        seen: Mutex<Option<Request>>,
    }

    #[async_trait]
    impl Handler for EchoHandler {
        async fn call(&self, writer: &mut ResponseWriter<'_>, request: Request) {
            let body = request.body().to_vec();
            *self.seen.lock().unwrap() = Some(request);

            writer.write_status_line(StatusCode::OK).await.unwrap();
            writer.write_headers(&default_headers(body.len())).await.unwrap();
            writer.write_body(&body).await.unwrap();
        }
    }

    async fn roundtrip(handler: &EchoHandler, request: &[u8]) -> (Result<(), HttpError>, String) {
        let (mut client, server) = tokio::io::duplex(4096);
        let (read_half, write_half) = tokio::io::split(server);

        client.write_all(request).await.unwrap();
        client.shutdown().await.unwrap();

        let result = HttpConnection::with_capacity(read_half, write_half, 8).process(handler).await;

        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        (result, String::from_utf8(response).unwrap())
    }

    #[tokio::test]
    async fn echo_post_body() {
        let handler = EchoHandler::default();
        let request = indoc! {"
            POST /echo HTTP/1.1
            Host: localhost:42069
            Content-Length: 11

            hello world"}
        .replace('\n', "\r\n");

        let (result, response) = roundtrip(&handler, request.as_bytes()).await;

        result.unwrap();
        assert_eq!(
            response,
            "HTTP/1.1 200 OK\r\ncontent-length: 11\r\nconnection: close\r\ncontent-type: text/plain\r\n\r\nhello world"
        );
        let seen = handler.seen.lock().unwrap().take().unwrap();
        assert_eq!(seen.method(), Some(Method::Post));
        assert_eq!(seen.headers().get("host"), Some("localhost:42069"));
    }

    #[tokio::test]
    async fn malformed_request_gets_bad_request() {
        let handler = EchoHandler::default();

        let (result, response) = roundtrip(&handler, b"/coffee HTTP/1.1\r\nHost: localhost\r\n\r\n").await;

        assert!(matches!(result, Err(HttpError::RequestError { source: ParseError::MalformedRequestLine { .. } })));
        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{response}");
        let (head, body) = response.split_once("\r\n\r\n").unwrap();
        assert!(head.contains(&format!("content-length: {}", body.len())));
        assert!(body.starts_with("malformed request line"), "{body}");
        assert!(handler.seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn unsupported_method_gets_bad_request() {
        let handler = EchoHandler::default();

        let (result, response) = roundtrip(&handler, b"DELETE / HTTP/1.1\r\n\r\n").await;

        result.unwrap_err();
        assert!(response.ends_with("unsupported http method: \"DELETE\""), "{response}");
    }

    #[tokio::test]
    async fn empty_connection_skips_handler() {
        let handler = EchoHandler::default();

        let (result, response) = roundtrip(&handler, b"").await;

        result.unwrap();
        assert!(response.is_empty());
        assert!(handler.seen.lock().unwrap().is_none());
    }

    struct SilentHandler;

    #[async_trait]
    impl Handler for SilentHandler {
        async fn call(&self, _writer: &mut ResponseWriter<'_>, _request: Request) {}
    }

    #[tokio::test]
    async fn silent_handler_closes_connection() {
        let (mut client, server) = tokio::io::duplex(256);
        let (read_half, write_half) = tokio::io::split(server);
        client.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();

        HttpConnection::new(read_half, write_half).process(&SilentHandler).await.unwrap();

        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        assert!(response.is_empty());
    }

    struct TrailerHandler;

    #[async_trait]
    impl Handler for TrailerHandler {
        async fn call(&self, writer: &mut ResponseWriter<'_>, _request: Request) {
            let mut headers = Headers::new();
            headers.set("Transfer-Encoding", "chunked");
            writer.write_status_line(StatusCode::OK).await.unwrap();
            writer.write_headers(&headers).await.unwrap();
            writer.write_chunked_body(b"streamed").await.unwrap();
            writer.write_chunked_body_done().await.unwrap();
            writer.write_trailers(&Headers::new()).await.unwrap();
        }
    }

    #[tokio::test]
    async fn chunked_response() {
        let (mut client, server) = tokio::io::duplex(256);
        let (read_half, write_half) = tokio::io::split(server);
        client.write_all(b"GET /stream HTTP/1.1\r\n\r\n").await.unwrap();

        HttpConnection::new(read_half, write_half).process(&TrailerHandler).await.unwrap();

        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        assert_eq!(
            str::from_utf8(&response).unwrap(),
            "HTTP/1.1 200 OK\r\ntransfer-encoding: chunked\r\n\r\n8\r\nstreamed\r\n0\r\n\r\n"
        );
    }
}
