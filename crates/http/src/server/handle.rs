use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::select;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::connection::HttpConnection;
use crate::handler::Handler;

/// Shutdown signal shared between a [`ServerHandle`] and its accept loop.
#[derive(Debug, Default)]
struct Shutdown {
    closed: AtomicBool,
    token: CancellationToken,
}

impl Shutdown {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// A handle to a running [`Server`](crate::server::Server).
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Arc<Shutdown>,
    accept_task: JoinHandle<()>,
}

impl ServerHandle {
    pub(crate) fn spawn<H>(accept_loop: AcceptLoop<H>, local_addr: SocketAddr) -> Self
    where
        H: Handler + 'static,
    {
        let shutdown = Arc::clone(&accept_loop.shutdown);
        let accept_task = tokio::spawn(accept_loop.run());
        Self { local_addr, shutdown, accept_task }
    }

    /// The address the listener is bound to, with the actual port if port `0` was requested.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_closed()
    }

    /// Stops accepting new connections and closes the listener.
    ///
    /// Connections that were already accepted run to completion. Calling `close`
    /// more than once has no further effect.
    pub fn close(&self) {
        if self.shutdown.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        info!(address = %self.local_addr, "closing server");
        self.shutdown.token.cancel();
    }

    /// Waits until the accept loop has exited and the listener is dropped.
    ///
    /// This only returns after [`close`](Self::close) has been called.
    pub async fn closed(self) {
        if let Err(e) = self.accept_task.await {
            error!(cause = %e, "accept loop terminated abnormally");
        }
    }
}

/// Accepts connections until the server is closed, serving each on its own task.
pub(crate) struct AcceptLoop<H> {
    tcp_listener: TcpListener,
    handler: Arc<H>,
    read_buffer_capacity: usize,
    shutdown: Arc<Shutdown>,
}

impl<H> AcceptLoop<H>
where
    H: Handler + 'static,
{
    pub(crate) fn new(tcp_listener: TcpListener, handler: Arc<H>, read_buffer_capacity: usize) -> Self {
        Self { tcp_listener, handler, read_buffer_capacity, shutdown: Arc::new(Shutdown::default()) }
    }

    async fn run(self) {
        let Self { tcp_listener, handler, read_buffer_capacity, shutdown } = self;

        loop {
            let accepted = select! {
                biased;
                () = shutdown.token.cancelled() => break,
                accepted = tcp_listener.accept() => accepted,
            };

            let (tcp_stream, remote_addr) = match accepted {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    if shutdown.is_closed() {
                        break;
                    }
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                let (reader, writer) = tcp_stream.into_split();
                let connection = HttpConnection::with_capacity(reader, writer, read_buffer_capacity);
                match connection.process(handler.as_ref()).await {
                    Ok(()) => {
                        info!(%remote_addr, "finished process, connection shutdown");
                    }
                    Err(e) => {
                        error!(%remote_addr, cause = %e, "service has error, connection shutdown");
                    }
                }
            });
        }

        drop(tcp_listener);
        info!("listener closed, stop accepting connections");
    }
}

impl<H> std::fmt::Debug for AcceptLoop<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcceptLoop").field("tcp_listener", &self.tcp_listener).finish_non_exhaustive()
    }
}
