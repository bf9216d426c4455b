//! In-process SNMPv1 agent for testing.
//!
//! Serves a `BTreeMap<Oid, Value>` over UDP on an ephemeral localhost port
//! and shuts down on drop.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use mibwalk::error::ErrorStatus;
use mibwalk::message::CommunityMessage;
use mibwalk::{Oid, Pdu, PduType, Value, VarBind};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::fixtures;

/// How the agent answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentMode {
    /// GetNext past the last entry answers noSuchName.
    #[default]
    Normal,
    /// Receives and counts requests but never answers.
    Silent,
    /// GetNext past the last entry starts over at the first entry.
    Wrap,
}

struct Shared {
    data: Mutex<BTreeMap<Oid, Value>>,
    community: Bytes,
    mode: AgentMode,
    requests: AtomicUsize,
}

/// An in-process SNMPv1 agent.
///
/// ```ignore
/// let agent = TestAgent::new().await;
/// let comm = Communicator::open("127.0.0.1", agent.port(), "public", timeout).await?;
/// ```
pub struct TestAgent {
    addr: SocketAddr,
    shared: Arc<Shared>,
    cancel: CancellationToken,
    _task: JoinHandle<()>,
}

impl TestAgent {
    /// Agent with the system group.
    pub async fn new() -> Self {
        Self::with_data(fixtures::system_mib()).await
    }

    pub async fn with_data(data: BTreeMap<Oid, Value>) -> Self {
        Self::start(data, "public", AgentMode::Normal).await
    }

    pub async fn with_mode(data: BTreeMap<Oid, Value>, mode: AgentMode) -> Self {
        Self::start(data, "public", mode).await
    }

    pub async fn start(data: BTreeMap<Oid, Value>, community: &str, mode: AgentMode) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test agent");
        let addr = socket.local_addr().expect("test agent address");
        let shared = Arc::new(Shared {
            data: Mutex::new(data),
            community: Bytes::copy_from_slice(community.as_bytes()),
            mode,
            requests: AtomicUsize::new(0),
        });
        let cancel = CancellationToken::new();

        let task = tokio::spawn(serve(socket, shared.clone(), cancel.clone()));

        Self {
            addr,
            shared,
            cancel,
            _task: task,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Number of well-formed requests received, answered or not.
    pub fn request_count(&self) -> usize {
        self.shared.requests.load(Ordering::SeqCst)
    }

    /// Insert or update a value.
    pub fn set(&self, oid: Oid, value: Value) {
        self.shared.data.lock().unwrap().insert(oid, value);
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for TestAgent {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn serve(socket: UdpSocket, shared: Arc<Shared>, cancel: CancellationToken) {
    let mut buf = vec![0u8; 65535];
    loop {
        let (len, peer) = tokio::select! {
            _ = cancel.cancelled() => return,
            received = socket.recv_from(&mut buf) => match received {
                Ok(received) => received,
                Err(_) => return,
            },
        };

        let Ok(request) = CommunityMessage::decode(Bytes::copy_from_slice(&buf[..len])) else {
            continue;
        };
        // v1 agents drop requests with a foreign community
        if request.community != shared.community {
            continue;
        }
        shared.requests.fetch_add(1, Ordering::SeqCst);
        if shared.mode == AgentMode::Silent {
            continue;
        }

        let response = answer(&shared, &request.pdu);
        let reply = CommunityMessage::new(request.community.clone(), response).encode();
        let _ = socket.send_to(&reply, peer).await;
    }
}

fn answer(shared: &Shared, request: &Pdu) -> Pdu {
    let data = shared.data.lock().unwrap();
    let mut varbinds = Vec::with_capacity(request.varbinds.len());

    for (index, vb) in request.varbinds.iter().enumerate() {
        let found = match request.pdu_type {
            PduType::GetRequest => data.get_key_value(&vb.oid),
            PduType::GetNextRequest => data
                .range((Bound::Excluded(&vb.oid), Bound::Unbounded))
                .next()
                .or_else(|| match shared.mode {
                    AgentMode::Wrap => data.iter().next(),
                    _ => None,
                }),
            PduType::GetResponse => None,
        };

        match found {
            Some((oid, value)) => varbinds.push(VarBind::new(oid.clone(), value.clone())),
            None => {
                let mut response = Pdu::get_response(request.request_id, request.varbinds.clone());
                response.error_status = ErrorStatus::NoSuchName.as_i32();
                response.error_index = index as i32 + 1;
                return response;
            }
        }
    }

    Pdu::get_response(request.request_id, varbinds)
}
