use std::io;
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::connection::DEFAULT_READ_BUFFER_CAPACITY;
use crate::handler::Handler;
use crate::server::handle::{AcceptLoop, ServerHandle};
use crate::server::ServerError;

/// Configures a [`Server`].
///
/// The listen address is required: set it with [`port`](Self::port) to listen on
/// all interfaces or with [`address`](Self::address) for anything else.
#[derive(Debug)]
pub struct ServerBuilder {
    address: Option<io::Result<Vec<SocketAddr>>>,
    read_buffer_capacity: usize,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { address: None, read_buffer_capacity: DEFAULT_READ_BUFFER_CAPACITY }
    }

    /// Listens on `0.0.0.0:<port>`; port `0` picks a free port.
    #[must_use]
    pub fn port(self, port: u16) -> Self {
        self.address((Ipv4Addr::UNSPECIFIED, port))
    }

    #[must_use]
    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(Iterator::collect));
        self
    }

    /// Initial size of each connection's read buffer. Values below one are raised to one.
    #[must_use]
    pub fn read_buffer_capacity(mut self, capacity: usize) -> Self {
        self.read_buffer_capacity = capacity.max(1);
        self
    }

    /// # Errors
    ///
    /// Fails if no address was set or the address could not be resolved.
    pub fn build(self) -> Result<Server, ServerError> {
        let address = self.address.ok_or(ServerError::MissingAddress)?.map_err(|source| ServerError::InvalidAddress { source })?;
        Ok(Server { address, read_buffer_capacity: self.read_buffer_capacity })
    }
}

/// A TCP server running one [`HttpConnection`](crate::connection::HttpConnection)
/// per accepted socket.
#[derive(Debug, Clone)]
pub struct Server {
    address: Vec<SocketAddr>,
    read_buffer_capacity: usize,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn address(&self) -> &[SocketAddr] {
        &self.address
    }

    pub fn read_buffer_capacity(&self) -> usize {
        self.read_buffer_capacity
    }

    /// Binds the listener and starts accepting connections in the background.
    ///
    /// Returns once the socket is bound; connections are then served until
    /// [`ServerHandle::close`] is called. Dropping the handle does not stop the
    /// server.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the listener can't be bound.
    pub async fn serve<H>(self, handler: H) -> Result<ServerHandle, ServerError>
    where
        H: Handler + 'static,
    {
        let tcp_listener = TcpListener::bind(self.address.as_slice())
            .await
            .map_err(|source| ServerError::Bind { address: self.address.clone(), source })?;
        let local_addr =
            tcp_listener.local_addr().map_err(|source| ServerError::Bind { address: self.address.clone(), source })?;
        info!(address = %local_addr, "start listening");

        let accept_loop = AcceptLoop::new(tcp_listener, Arc::new(handler), self.read_buffer_capacity);
        Ok(ServerHandle::spawn(accept_loop, local_addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_binds_all_interfaces() {
        let server = Server::builder().port(42069).build().unwrap();

        assert_eq!(server.address(), [SocketAddr::from(([0, 0, 0, 0], 42069))]);
        assert_eq!(server.read_buffer_capacity(), DEFAULT_READ_BUFFER_CAPACITY);
    }

    #[test]
    fn read_buffer_capacity_at_least_one() {
        let server = Server::builder().address("127.0.0.1:0").read_buffer_capacity(0).build().unwrap();

        assert_eq!(server.read_buffer_capacity(), 1);
    }

    #[test]
    fn address_is_required() {
        let err = Server::builder().build().unwrap_err();

        assert!(matches!(err, ServerError::MissingAddress));
    }

    #[test]
    fn unresolvable_address() {
        let err = Server::builder().address("not an address").build().unwrap_err();

        assert!(matches!(err, ServerError::InvalidAddress { .. }));
    }
}
