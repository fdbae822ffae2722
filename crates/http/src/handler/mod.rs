//! Request handlers
//!
//! A [`Handler`] receives the parsed [`Request`] and a [`ResponseWriter`] bound to
//! the connection, and produces its response by calling the writer directly. The
//! connection is closed as soon as `call` returns, whatever the handler wrote.

use std::sync::Arc;

use async_trait::async_trait;

use crate::connection::ResponseWriter;
use crate::protocol::Request;

#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, writer: &mut ResponseWriter<'_>, request: Request);
}

#[async_trait]
impl<H> Handler for Arc<H>
where
    H: Handler + ?Sized,
{
    async fn call(&self, writer: &mut ResponseWriter<'_>, request: Request) {
        (**self).call(writer, request).await;
    }
}
