//! UDP transport and host resolution.

use super::{Connector, ResolvedHost, Transport};
use crate::config::RECV_BUFFER_SIZE;
use crate::error::{Error, Result};
use crate::util::bind_ephemeral_udp_socket;
use bytes::Bytes;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

/// A connected UDP socket to one agent.
///
/// The socket is released when the transport is dropped. [`close`](Transport::close)
/// stops further use and wakes a pending receive.
pub struct UdpTransport {
    socket: UdpSocket,
    target: SocketAddr,
    local_addr: SocketAddr,
    closed: CancellationToken,
}

impl UdpTransport {
    /// Bind an ephemeral port and connect it to `target`.
    pub async fn connect(target: SocketAddr) -> Result<Self> {
        let io_err = |source| Error::Io { target, source }.boxed();

        let socket = bind_ephemeral_udp_socket(target).map_err(io_err)?;
        socket.connect(target).await.map_err(io_err)?;
        let local_addr = socket.local_addr().map_err(io_err)?;

        tracing::debug!(target: "mibwalk::transport", { snmp.target = %target, snmp.local_addr = %local_addr }, "UDP transport connected");

        Ok(Self {
            socket,
            target,
            local_addr,
            closed: CancellationToken::new(),
        })
    }

    /// Local bind address.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl Transport for UdpTransport {
    async fn send(&self, data: &[u8]) -> Result<()> {
        if self.closed.is_cancelled() {
            return Err(Error::Closed.boxed());
        }
        tracing::trace!(target: "mibwalk::transport", { snmp.target = %self.target, snmp.bytes = data.len() }, "UDP send");
        self.socket.send(data).await.map_err(|source| {
            Error::Io {
                target: self.target,
                source,
            }
            .boxed()
        })?;
        Ok(())
    }

    async fn recv(&self, recv_timeout: Duration) -> Result<Bytes> {
        let mut buf = vec![0u8; RECV_BUFFER_SIZE];

        let result = tokio::select! {
            biased;
            _ = self.closed.cancelled() => return Err(Error::Closed.boxed()),
            r = timeout(recv_timeout, self.socket.recv(&mut buf)) => r,
        };

        match result {
            Ok(Ok(len)) => {
                buf.truncate(len);
                tracing::trace!(target: "mibwalk::transport", { snmp.target = %self.target, snmp.bytes = len }, "UDP recv");
                Ok(Bytes::from(buf))
            }
            Ok(Err(source)) => Err(Error::Io {
                target: self.target,
                source,
            }
            .boxed()),
            Err(_) => Err(Error::NoResponse {
                target: self.target,
                elapsed: recv_timeout,
            }
            .boxed()),
        }
    }

    fn peer_addr(&self) -> SocketAddr {
        self.target
    }

    fn close(&self) {
        if !self.closed.is_cancelled() {
            tracing::debug!(target: "mibwalk::transport", { snmp.target = %self.target }, "closing UDP transport");
            self.closed.cancel();
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}

/// Resolves through the system resolver and connects over UDP.
#[derive(Debug, Clone, Copy, Default)]
pub struct UdpConnector;

impl Connector for UdpConnector {
    type Transport = UdpTransport;

    async fn resolve(&self, host: &str, port: u16) -> Result<ResolvedHost> {
        let unknown = |source| {
            Error::UnknownHost {
                host: host.into(),
                source,
            }
            .boxed()
        };

        let mut addrs = tokio::net::lookup_host((host, port))
            .await
            .map_err(|e| unknown(Some(e)))?;
        let addr = addrs.next().ok_or_else(|| unknown(None))?;

        tracing::debug!(target: "mibwalk::transport", { snmp.host = host, snmp.target = %addr }, "host resolved");

        Ok(ResolvedHost {
            input: host.to_string(),
            canonical: addr.ip().to_string(),
            addr,
        })
    }

    async fn connect(&self, addr: SocketAddr) -> Result<UdpTransport> {
        UdpTransport::connect(addr).await
    }
}
