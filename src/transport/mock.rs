//! Programmable transport and connector for tests.
//!
//! Responses are queued in order and handed out one per `recv`. Requests are
//! decoded and recorded so tests can assert on what was sent.

use super::{Connector, ResolvedHost, Transport};
use crate::error::{Error, Result};
use crate::message::CommunityMessage;
use crate::oid::Oid;
use crate::pdu::Pdu;
use crate::value::Value;
use crate::varbind::VarBind;
use bytes::Bytes;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// What the mock does for one `recv`.
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Reply with this message, its request id patched to the last request.
    Data(Bytes),
    /// Reply with these bytes untouched.
    RawData(Bytes),
    /// Fail with `NoResponse` immediately.
    Timeout,
    /// Fail with an I/O error.
    IoError(String),
    /// Wait for `gate` to be notified, then behave like `Data`.
    Gated { gate: Arc<Notify>, data: Bytes },
}

/// A request seen by the mock.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub data: Bytes,
    /// Decoded PDU, when the bytes were a valid message.
    pub pdu: Option<Pdu>,
}

impl RecordedRequest {
    /// OID of the first varbind, if the request decoded.
    pub fn oid(&self) -> Option<&Oid> {
        self.pdu.as_ref()?.varbinds.first().map(|vb| &vb.oid)
    }
}

struct MockState {
    responses: VecDeque<MockResponse>,
    default_response: Option<MockResponse>,
    requests: Vec<RecordedRequest>,
    last_request_id: Option<i32>,
    connects: usize,
}

struct MockShared {
    target: SocketAddr,
    state: Mutex<MockState>,
    closed: CancellationToken,
}

/// Mock transport. Clones share the same queue and recordings.
///
/// Requires the `testing` feature outside this crate's own tests.
///
/// ```ignore
/// use mibwalk::transport::{MockTransport, ResponseBuilder};
/// use mibwalk::{oid, Value};
///
/// let mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
/// mock.queue_response(
///     ResponseBuilder::new(0)
///         .varbind(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("router"))
///         .build("public"),
/// );
/// mock.queue_timeout();
/// ```
#[derive(Clone)]
pub struct MockTransport {
    shared: Arc<MockShared>,
}

impl MockTransport {
    /// Create a mock whose peer is `target`.
    pub fn new(target: SocketAddr) -> Self {
        Self {
            shared: Arc::new(MockShared {
                target,
                state: Mutex::new(MockState {
                    responses: VecDeque::new(),
                    default_response: None,
                    requests: Vec::new(),
                    last_request_id: None,
                    connects: 0,
                }),
                closed: CancellationToken::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue any response.
    pub fn queue(&self, response: MockResponse) {
        self.state().responses.push_back(response);
    }

    /// Queue a reply whose request id will be patched to match.
    pub fn queue_response(&self, data: impl Into<Bytes>) {
        self.queue(MockResponse::Data(data.into()));
    }

    /// Queue a reply returned byte for byte.
    pub fn queue_raw_response(&self, data: impl Into<Bytes>) {
        self.queue(MockResponse::RawData(data.into()));
    }

    /// Queue a timeout.
    pub fn queue_timeout(&self) {
        self.queue(MockResponse::Timeout);
    }

    /// Queue an I/O failure.
    pub fn queue_io_error(&self, msg: impl Into<String>) {
        self.queue(MockResponse::IoError(msg.into()));
    }

    /// Queue a reply held back until the returned gate is notified.
    pub fn queue_gated_response(&self, data: impl Into<Bytes>) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.queue(MockResponse::Gated {
            gate: gate.clone(),
            data: data.into(),
        });
        gate
    }

    /// Response used once the queue runs dry. Without one, `recv` times out.
    pub fn set_default_response(&self, response: MockResponse) {
        self.state().default_response = Some(response);
    }

    /// Every request sent so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    /// Responses still queued.
    pub fn queued_response_count(&self) -> usize {
        self.state().responses.len()
    }

    /// How many times a [`MockConnector`] handed this transport out.
    pub fn connect_count(&self) -> usize {
        self.state().connects
    }

    fn patch_request_id(data: Bytes, request_id: Option<i32>) -> Bytes {
        let Some(request_id) = request_id else {
            return data;
        };
        match CommunityMessage::decode(data.clone()) {
            Ok(mut msg) => {
                msg.pdu.request_id = request_id;
                msg.encode()
            }
            Err(_) => data,
        }
    }

    fn timeout_error(&self, elapsed: Duration) -> Box<Error> {
        Error::NoResponse {
            target: self.shared.target,
            elapsed,
        }
        .boxed()
    }
}

impl Transport for MockTransport {
    async fn send(&self, data: &[u8]) -> Result<()> {
        if self.is_closed() {
            return Err(Error::Closed.boxed());
        }
        let data = Bytes::copy_from_slice(data);
        let pdu = CommunityMessage::decode(data.clone())
            .ok()
            .map(CommunityMessage::into_pdu);

        let mut state = self.state();
        state.last_request_id = pdu.as_ref().map(|p| p.request_id);
        state.requests.push(RecordedRequest { data, pdu });
        Ok(())
    }

    async fn recv(&self, timeout: Duration) -> Result<Bytes> {
        if self.is_closed() {
            return Err(Error::Closed.boxed());
        }

        let (response, request_id) = {
            let mut state = self.state();
            let response = state
                .responses
                .pop_front()
                .or_else(|| state.default_response.clone());
            (response, state.last_request_id)
        };

        match response {
            Some(MockResponse::Data(data)) => Ok(Self::patch_request_id(data, request_id)),
            Some(MockResponse::RawData(data)) => Ok(data),
            Some(MockResponse::Gated { gate, data }) => {
                tokio::select! {
                    biased;
                    _ = self.shared.closed.cancelled() => Err(Error::Closed.boxed()),
                    _ = gate.notified() => Ok(Self::patch_request_id(data, request_id)),
                }
            }
            Some(MockResponse::IoError(msg)) => Err(Error::Io {
                target: self.shared.target,
                source: std::io::Error::other(msg),
            }
            .boxed()),
            Some(MockResponse::Timeout) | None => Err(self.timeout_error(timeout)),
        }
    }

    fn peer_addr(&self) -> SocketAddr {
        self.shared.target
    }

    fn close(&self) {
        self.shared.closed.cancel();
    }

    fn is_closed(&self) -> bool {
        self.shared.closed.is_cancelled()
    }
}

/// Connector that hands out one shared [`MockTransport`].
///
/// Hosts registered with [`unknown_host`](Self::unknown_host) fail to resolve;
/// everything else resolves to the transport's peer IP.
#[derive(Clone)]
pub struct MockConnector {
    transport: MockTransport,
    unknown_hosts: Vec<String>,
}

impl MockConnector {
    pub fn new(transport: MockTransport) -> Self {
        Self {
            transport,
            unknown_hosts: Vec::new(),
        }
    }

    /// Make `host` fail resolution.
    pub fn unknown_host(mut self, host: impl Into<String>) -> Self {
        self.unknown_hosts.push(host.into());
        self
    }

    /// The transport returned by `connect`.
    pub fn transport(&self) -> &MockTransport {
        &self.transport
    }
}

impl Connector for MockConnector {
    type Transport = MockTransport;

    async fn resolve(&self, host: &str, port: u16) -> Result<ResolvedHost> {
        if self.unknown_hosts.iter().any(|h| h == host) {
            return Err(Error::UnknownHost {
                host: host.into(),
                source: None,
            }
            .boxed());
        }
        let addr = SocketAddr::new(self.transport.peer_addr().ip(), port);
        Ok(ResolvedHost {
            input: host.to_string(),
            canonical: addr.ip().to_string(),
            addr,
        })
    }

    async fn connect(&self, _addr: SocketAddr) -> Result<MockTransport> {
        self.transport.state().connects += 1;
        Ok(self.transport.clone())
    }
}

/// Builds GetResponse messages for queuing on the mock.
pub struct ResponseBuilder {
    request_id: i32,
    varbinds: Vec<VarBind>,
    error_status: i32,
    error_index: i32,
}

impl ResponseBuilder {
    /// Start a response. The id only matters for raw responses.
    pub fn new(request_id: i32) -> Self {
        Self {
            request_id,
            varbinds: Vec::new(),
            error_status: 0,
            error_index: 0,
        }
    }

    pub fn varbind(mut self, oid: Oid, value: Value) -> Self {
        self.varbinds.push(VarBind::new(oid, value));
        self
    }

    pub fn error_status(mut self, status: i32) -> Self {
        self.error_status = status;
        self
    }

    pub fn error_index(mut self, index: i32) -> Self {
        self.error_index = index;
        self
    }

    /// Encode as an SNMPv1 message.
    pub fn build(self, community: impl Into<Bytes>) -> Bytes {
        let mut pdu = Pdu::get_response(self.request_id, self.varbinds);
        pdu.error_status = self.error_status;
        pdu.error_index = self.error_index;
        CommunityMessage::new(community, pdu).encode()
    }
}
