//! TCP server module
//!
//! [`Server`] binds a listener and serves every accepted socket with an
//! [`HttpConnection`](crate::connection::HttpConnection) on its own task, so one
//! slow or misbehaving client never holds up another. The returned
//! [`ServerHandle`] closes the listener; connections already accepted are left
//! to finish.
//!
//! # Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use raw_http::connection::ResponseWriter;
//! use raw_http::handler::Handler;
//! use raw_http::protocol::{default_headers, Request, StatusCode};
//!
//! struct Hello;
//!
//! #[async_trait]
//! impl Handler for Hello {
//!     async fn call(&self, writer: &mut ResponseWriter<'_>, _request: Request) {
//!         let body = b"Hello World!\r\n";
//!         if writer.write_status_line(StatusCode::OK).await.is_err() {
//!             return;
//!         }
//!         if writer.write_headers(&default_headers(body.len())).await.is_err() {
//!             return;
//!         }
//!         let _ = writer.write_body(body).await;
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let handle = raw_http::server::serve(42069, Hello).await?;
//!     tokio::signal::ctrl_c().await?;
//!     handle.close();
//!     handle.closed().await;
//!     Ok(())
//! }
//! ```

mod builder;
mod error;
mod handle;

pub use builder::{Server, ServerBuilder};
pub use error::ServerError;
pub use handle::ServerHandle;

use crate::handler::Handler;

/// Serves `handler` on `0.0.0.0:<port>` with default settings.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the port can't be bound.
pub async fn serve<H>(port: u16, handler: H) -> Result<ServerHandle, ServerError>
where
    H: Handler + 'static,
{
    Server::builder().port(port).build()?.serve(handler).await
}
