//! Serves a few canned pages on port 42069.
//!
//! - `/yourproblem`: `400 Bad Request`
//! - `/myproblem`: `500 Internal Server Error`
//! - `/stream`: a chunked body followed by `X-Content-SHA256` and `X-Content-Length` trailers
//! - anything else: `200 OK`
//!
//! Run with `cargo run --example server` and stop with Ctrl-C.

use async_trait::async_trait;
use raw_http::connection::ResponseWriter;
use raw_http::handler::Handler;
use raw_http::protocol::{default_headers, Headers, Request, StatusCode, WriteError};
use sha2::{Digest, Sha256};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const PORT: u16 = 42069;

const BAD_REQUEST_PAGE: &str = "<html>
  <head>
    <title>400 Bad Request</title>
  </head>
  <body>
    <h1>Bad Request</h1>
    <p>Your request honestly kinda sucked.</p>
  </body>
</html>";

const INTERNAL_SERVER_ERROR_PAGE: &str = "<html>
  <head>
    <title>500 Internal Server Error</title>
  </head>
  <body>
    <h1>Internal Server Error</h1>
    <p>Okay, you know what? This one is on me.</p>
  </body>
</html>";

const OK_PAGE: &str = "<html>
  <head>
    <title>200 OK</title>
  </head>
  <body>
    <h1>Success!</h1>
    <p>Your request was an absolute banger.</p>
  </body>
</html>";

struct Pages;

#[async_trait]
impl Handler for Pages {
    async fn call(&self, writer: &mut ResponseWriter<'_>, request: Request) {
        let result = match request.target() {
            Some("/yourproblem") => write_html(writer, StatusCode::BAD_REQUEST, BAD_REQUEST_PAGE).await,
            Some("/myproblem") => write_html(writer, StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR_PAGE).await,
            Some("/stream") => write_stream(writer).await,
            _ => write_html(writer, StatusCode::OK, OK_PAGE).await,
        };

        if let Err(e) = result {
            warn!(cause = %e, "failed to write response");
        }
    }
}

async fn write_html(writer: &mut ResponseWriter<'_>, status: StatusCode, page: &str) -> Result<(), WriteError> {
    let mut headers = default_headers(page.len());
    headers.set("Content-Type", mime::TEXT_HTML.as_ref());

    writer.write_status_line(status).await?;
    writer.write_headers(&headers).await?;
    writer.write_body(page.as_bytes()).await?;
    info!(status = status.as_u16(), "sent page");
    Ok(())
}

async fn write_stream(writer: &mut ResponseWriter<'_>) -> Result<(), WriteError> {
    let mut headers = default_headers(0);
    headers.remove("Content-Length");
    headers.set("Transfer-Encoding", "chunked");
    headers.set("Trailer", "X-Content-SHA256, X-Content-Length");

    writer.write_status_line(StatusCode::OK).await?;
    writer.write_headers(&headers).await?;

    let mut hasher = Sha256::new();
    let mut total = 0;
    for n in 1..=10 {
        let line = format!("line {n} of 10\n");
        hasher.update(line.as_bytes());
        total += writer.write_chunked_body(line.as_bytes()).await?;
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
    writer.write_chunked_body_done().await?;

    let mut trailers = Headers::new();
    trailers.set("X-Content-SHA256", format!("{:x}", hasher.finalize()));
    trailers.set("X-Content-Length", total.to_string());
    writer.write_trailers(&trailers).await
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let handle = match raw_http::server::serve(PORT, Pages).await {
        Ok(handle) => handle,
        Err(e) => {
            error!(cause = %e, "bind server error");
            return;
        }
    };
    info!(address = %handle.local_addr(), "server started");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(cause = %e, "can't listen for shutdown signal");
    }

    handle.close();
    handle.closed().await;
    info!("server gracefully stopped");
}
