//! Transport layer abstraction.
//!
//! A [`Connector`] turns a host name into a [`ResolvedHost`] and opens a
//! [`Transport`] to it. The communicator and the walk engine only talk to
//! these traits; `MockTransport` and `MockConnector` implement them for
//! tests (feature `testing`).

mod udp;

#[cfg(any(test, feature = "testing"))]
mod mock;

pub use udp::{UdpConnector, UdpTransport};

#[cfg(any(test, feature = "testing"))]
pub use mock::*;

use crate::error::Result;
use bytes::Bytes;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

/// Datagram transport to a single agent.
pub trait Transport: Send + Sync {
    /// Send one request datagram.
    fn send(&self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Wait up to `timeout` for the next datagram from the peer.
    ///
    /// Fails with [`Error::NoResponse`](crate::Error::NoResponse) when the
    /// timeout elapses and with [`Error::Closed`](crate::Error::Closed) when
    /// [`close`](Transport::close) is called while waiting.
    fn recv(&self, timeout: Duration) -> impl Future<Output = Result<Bytes>> + Send;

    /// The agent address this transport sends to.
    fn peer_addr(&self) -> SocketAddr;

    /// Close the transport. Idempotent; wakes any pending `recv`.
    fn close(&self);

    /// Whether [`close`](Transport::close) has been called.
    fn is_closed(&self) -> bool;
}

/// Host as typed by the user plus the address it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHost {
    /// The host string exactly as given.
    pub input: String,
    /// Canonical form reported back to listeners (the resolved IP).
    pub canonical: String,
    pub addr: SocketAddr,
}

/// Resolves hosts and opens transports.
pub trait Connector: Send + Sync {
    type Transport: Transport + 'static;

    /// Resolve `host` once. Failure is [`Error::UnknownHost`](crate::Error::UnknownHost).
    fn resolve(&self, host: &str, port: u16) -> impl Future<Output = Result<ResolvedHost>> + Send;

    /// Open a transport to an already resolved address.
    fn connect(&self, addr: SocketAddr) -> impl Future<Output = Result<Self::Transport>> + Send;
}
