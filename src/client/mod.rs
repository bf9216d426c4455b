//! SNMPv1 communicator.
//!
//! A [`Communicator`] owns one transport to one agent and issues GetNext
//! requests over it, one at a time, with no retries.
//!
//! ```rust,no_run
//! use mibwalk::{Communicator, oid};
//! use std::time::Duration;
//!
//! # async fn example() -> mibwalk::Result<()> {
//! let comm = Communicator::open("192.0.2.1", 161, "public", Duration::from_secs(4)).await?;
//! for vb in comm.get_next(&oid!(1, 3, 6, 1, 2, 1, 1)).await? {
//!     println!("{}", vb);
//! }
//! comm.close();
//! # Ok(())
//! # }
//! ```

use std::net::SocketAddr;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;
use tracing::{Span, instrument};

use crate::config::{DEFAULT_COMMUNITY, DEFAULT_TIMEOUT};
use crate::error::{Error, Result};
use crate::format::hex;
use crate::message::CommunityMessage;
use crate::oid::Oid;
use crate::pdu::{Pdu, PduType};
use crate::transport::{Connector, Transport, UdpConnector, UdpTransport};
use crate::varbind::VarBind;

/// Request ids are unique across every communicator in the process.
static NEXT_REQUEST_ID: AtomicI32 = AtomicI32::new(1);

fn next_request_id() -> i32 {
    NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed)
}

/// Communicator settings.
#[derive(Debug, Clone)]
pub struct CommunicatorConfig {
    /// Community string (default: "public")
    pub community: Bytes,
    /// How long one request waits for its response (default: 4 seconds)
    pub timeout: Duration,
}

impl Default for CommunicatorConfig {
    fn default() -> Self {
        Self {
            community: Bytes::from_static(DEFAULT_COMMUNITY.as_bytes()),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// SNMPv1 request/response engine bound to one agent.
///
/// The transport is closed by [`close`](Self::close) or on drop.
pub struct Communicator<T: Transport = UdpTransport> {
    transport: T,
    config: CommunicatorConfig,
}

impl Communicator<UdpTransport> {
    /// Resolve `host` and open a UDP socket to it.
    ///
    /// Resolution happens once, here; an unresolvable host fails with
    /// [`Error::UnknownHost`] before anything is sent.
    pub async fn open(
        host: &str,
        port: u16,
        community: impl Into<Bytes>,
        timeout: Duration,
    ) -> Result<Self> {
        let resolved = UdpConnector.resolve(host, port).await?;
        let transport = UdpConnector.connect(resolved.addr).await?;
        Ok(Self::with_transport(
            transport,
            CommunicatorConfig {
                community: community.into(),
                timeout,
            },
        ))
    }
}

impl<T: Transport> Communicator<T> {
    /// Wrap an already connected transport.
    pub fn with_transport(transport: T, config: CommunicatorConfig) -> Self {
        Self { transport, config }
    }

    /// The agent address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.transport.peer_addr()
    }

    pub fn config(&self) -> &CommunicatorConfig {
        &self.config
    }

    /// Borrow the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Close the transport. Safe to call more than once.
    pub fn close(&self) {
        self.transport.close();
    }

    /// Send one GetNextRequest for `oid` and return the response bindings.
    ///
    /// Agents answer with exactly one binding; the list is returned as is so
    /// callers can detect an empty reply. An OID that BER cannot carry fails
    /// with [`Error::InvalidOid`] before anything is sent.
    #[instrument(skip(self), err, fields(snmp.target = %self.peer_addr(), snmp.oid = %oid))]
    pub async fn get_next(&self, oid: &Oid) -> Result<Vec<VarBind>> {
        oid.validate()?;
        let pdu = Pdu::get_next_request(next_request_id(), std::slice::from_ref(oid));
        Ok(self.send_request(pdu).await?.varbinds)
    }

    /// Send one GetRequest for `oid` and return the response bindings.
    #[instrument(skip(self), err, fields(snmp.target = %self.peer_addr(), snmp.oid = %oid))]
    pub async fn get(&self, oid: &Oid) -> Result<Vec<VarBind>> {
        oid.validate()?;
        let pdu = Pdu::get_request(next_request_id(), std::slice::from_ref(oid));
        Ok(self.send_request(pdu).await?.varbinds)
    }

    #[instrument(
        level = "debug",
        skip(self, request),
        fields(
            snmp.request_id = request.request_id,
            snmp.ignored = tracing::field::Empty,
            snmp.elapsed_ms = tracing::field::Empty,
        )
    )]
    async fn send_request(&self, request: Pdu) -> Result<Pdu> {
        let request_id = request.request_id;
        let target = self.peer_addr();
        tracing::debug!(target: "mibwalk::client", { snmp.pdu_type = %request.pdu_type, snmp.varbind_count = request.varbinds.len() }, "sending {}", request.pdu_type);

        let message = CommunityMessage::new(self.config.community.clone(), request);
        let data = message.encode();
        let start = Instant::now();
        let deadline = start + self.config.timeout;

        self.transport.send(&data).await?;

        let mut ignored = 0u32;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let reply = if remaining.is_zero() {
                None
            } else {
                match self.transport.recv(remaining).await {
                    Ok(reply) => Some(reply),
                    Err(e) if matches!(*e, Error::NoResponse { .. }) => None,
                    Err(e) => return Err(e),
                }
            };

            let Some(reply) = reply else {
                let elapsed = start.elapsed();
                Span::current().record("snmp.elapsed_ms", elapsed.as_millis() as u64);
                tracing::debug!(target: "mibwalk::client", { snmp.request_id = request_id, snmp.target = %target, ?elapsed }, "request timed out");
                return Err(Error::NoResponse { target, elapsed }.boxed());
            };

            let response = match CommunityMessage::decode(reply.clone()) {
                Ok(message) => message.into_pdu(),
                Err(e) => {
                    tracing::debug!(target: "mibwalk::client", { snmp.target = %target, snmp.bytes = reply.len(), snmp.data = %hex::Bytes(&reply) }, "undecodable response");
                    return Err(e);
                }
            };

            if response.request_id != request_id || response.pdu_type != PduType::GetResponse {
                ignored += 1;
                Span::current().record("snmp.ignored", ignored);
                tracing::warn!(target: "mibwalk::client", { expected_request_id = request_id, actual_request_id = response.request_id, pdu_type = %response.pdu_type, peer = %target }, "ignoring unrelated response");
                continue;
            }

            Span::current().record("snmp.elapsed_ms", start.elapsed().as_millis() as u64);

            if response.is_error() {
                return Err(self.agent_error(&response, &message.pdu.varbinds));
            }

            tracing::debug!(target: "mibwalk::client", { snmp.varbind_count = response.varbinds.len() }, "received GetResponse");
            return Ok(response);
        }
    }

    /// Build the agent error for a failed response, naming the request OID
    /// the error index points at.
    fn agent_error(&self, response: &Pdu, request: &[VarBind]) -> Box<Error> {
        let status = response.error_status_enum();
        let oid = response.errored_oid(request).cloned();
        tracing::debug!(target: "mibwalk::client", { snmp.error_status = %status, snmp.error_index = response.error_index, peer = %self.peer_addr() }, "agent reported error");
        Error::Agent {
            status,
            index: u32::try_from(response.error_index).unwrap_or(0),
            oid,
        }
        .boxed()
    }
}

impl<T: Transport> Drop for Communicator<T> {
    fn drop(&mut self) {
        self.transport.close();
    }
}
